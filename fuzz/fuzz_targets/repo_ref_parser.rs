#![no_main]

use libfuzzer_sys::fuzz_target;
use prscope::repo_ref::RepositoryRef;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic; a parsed ref always has both halves
        if let Ok(repo) = RepositoryRef::parse(input) {
            assert!(!repo.owner.is_empty());
            assert!(!repo.name.is_empty());
            assert_eq!(repo.full_name(), format!("{}/{}", repo.owner, repo.name));
        }
    }
});
