use ignoreguard_types::policy::BranchAllowlist;

/// Whether pull requests into `target_branch` are policed.
///
/// Pure and total. Most deliveries take the `false` path.
pub fn should_process(allowlist: &BranchAllowlist, target_branch: &str) -> bool {
    allowlist.contains(target_branch)
}
