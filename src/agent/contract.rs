//! The capability every persona supplies.

use crate::agent::tools::ToolOutput;
use crate::errors::AgentResult;
use crate::models::IssueRecord;

/// A simulated user profile that runs a tool and interprets its output.
///
/// Implementations are chosen at construction time and driven through
/// [`crate::agent::Agent`], which owns the lifecycle around these two calls.
pub trait Persona {
    /// Display name, e.g. "Lakshmi". Lower-cased, it keys scenario expectations.
    fn name(&self) -> &str;

    /// Who the persona is and which assistive technology they rely on.
    fn description(&self) -> &str;

    /// Run the tool against a URL or an HTML document.
    ///
    /// Tool failures are returned as errors. An output without a tool name
    /// is accepted and recorded as "unknown".
    fn run_tool(&self, input: &str) -> AgentResult<ToolOutput>;

    /// Map raw tool output to issues. An empty list is a pass, not an error.
    fn analyze_output(&self, output: &ToolOutput) -> Vec<IssueRecord>;
}

impl<P: Persona + ?Sized> Persona for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn run_tool(&self, input: &str) -> AgentResult<ToolOutput> {
        (**self).run_tool(input)
    }

    fn analyze_output(&self, output: &ToolOutput) -> Vec<IssueRecord> {
        (**self).analyze_output(output)
    }
}
