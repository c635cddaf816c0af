//! Last-modified fingerprints for overlays

use fabric_profile::Profile;

/// Fingerprint of a profile: its own hash followed by `-<hash>` for every
/// direct parent, in declared order.
///
/// Profile hashes already fold in the hashes of their ancestors, so a change
/// anywhere above the profile changes the fingerprint.
pub fn fingerprint(profile: &Profile) -> String {
    let mut out = profile.profile_hash().to_string();
    for parent in profile.parents() {
        out.push('-');
        out.push_str(parent.profile_hash());
    }
    out
}
