/// Switches that change how members are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberOptions {
    /// Name parameters from the `LocalVariableTable` when one is present.
    pub use_name_table: bool,
    /// Start non-static bridge methods hidden.
    pub hide_bridge_methods: bool,
}

impl Default for MemberOptions {
    fn default() -> Self {
        Self {
            use_name_table: true,
            hide_bridge_methods: true,
        }
    }
}
