//! The continuation policy — a pure function from state to next node.

use crate::state::ResearchState;
use scour_core::message::Role;

/// Loop bounds.
#[derive(Debug, Clone, Copy)]
pub struct LoopLimits {
    /// Hard ceiling on agent steps (safety bound against runaway loops)
    pub max_steps: u32,

    /// Minimum tool invocations before the agent may settle on an answer
    pub min_tool_calls: u32,
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_steps: 15,
            min_tool_calls: 2,
        }
    }
}

/// Where control goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    /// Execute the requested tool calls
    Tools,
    /// Compact the latest tool result
    Process,
    /// Back to the agent (with an injected reminder to keep using tools)
    Agent,
    /// Terminate the run
    End,
}

/// Decide the next node, evaluated after every agent step.
///
/// In order:
/// 1. Step budget spent → End, regardless of anything else.
/// 2. The last message requests tool calls → Tools.
/// 3. The last message is a tool result → Process.
/// 4. The agent claims satisfaction before the minimum tool use → Agent
///    (the runner injects a reminder message).
/// 5. Otherwise → End.
pub fn decide_next(state: &ResearchState, limits: &LoopLimits) -> NextNode {
    if state.step_count >= limits.max_steps {
        return NextNode::End;
    }

    if let Some(last) = state.last_message() {
        if last.role == Role::Assistant && last.requests_tools() {
            return NextNode::Tools;
        }
        if last.role == Role::Tool {
            return NextNode::Process;
        }
    }

    if state.satisfied && state.tool_call_count < limits.min_tool_calls {
        return NextNode::Agent;
    }

    NextNode::End
}
