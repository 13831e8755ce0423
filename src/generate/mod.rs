//! Compilation of expressions to Liquid and of queries to data files.

mod blocks;
mod data_file;
mod liquid;
mod output;

pub use blocks::{
    assign_block, echo_block, echo_inline, if_block, loop_block, state_variable_name, Condition,
    LOOP_DATA_STATE_ID,
};
pub use data_file::{get_data_file, query_to_data_file};
pub use liquid::{
    get_liquid_block, get_liquid_statement, get_liquid_statement_filters, get_liquid_statement_properties,
    validate_expression, Statement,
};
pub use output::Output;

use crate::ast::Component;
use crate::config::Options;

/// State of one publish pass: variable counter and build-wide cache buster.
/// Passes never share a context.
#[derive(Debug, Clone)]
pub struct CompileContext {
    next_variable: usize,
    build_id: u32,
    global_data_sources: Vec<String>,
}

impl CompileContext {
    pub fn new(options: &Options) -> Self {
        let build_id = getrandom::u32().unwrap_or_else(|err| {
            log::warn!("no random source for the build id: {}", err);
            0
        });
        Self::with_build_id(options, build_id)
    }

    /// Context with a known build id, for reproducible output
    pub fn with_build_id(options: &Options, build_id: u32) -> Self {
        Self {
            next_variable: 0,
            build_id,
            global_data_sources: options.global_data_sources.clone(),
        }
    }

    /// Fresh intermediate variable, `var_<component id>_<n>`
    pub fn next_variable_name(&mut self, component: &Component) -> String {
        let n = self.next_variable;
        self.next_variable += 1;
        format!("var_{}_{}", component.id, n)
    }

    pub fn build_id(&self) -> u32 {
        self.build_id
    }

    /// Global data sources are read from the generator's data cascade, without receiver
    pub fn is_global_data_source(&self, id: &str) -> bool {
        self.global_data_sources.iter().any(|global| global == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_names_are_unique_per_pass() {
        let options = Options::default();
        let component = Component {
            id: "c1".into(),
            ..Component::default()
        };
        let mut ctx = CompileContext::with_build_id(&options, 7);
        assert_eq!(ctx.next_variable_name(&component), "var_c1_0");
        assert_eq!(ctx.next_variable_name(&component), "var_c1_1");

        let mut other = CompileContext::with_build_id(&options, 7);
        assert_eq!(other.next_variable_name(&component), "var_c1_0");
        assert_eq!(other.build_id(), 7);
    }
}
