//! Result compaction — raw tool output becomes typed findings and a short
//! transcript summary.
//!
//! After every tool call the loop hands the typed output here. Compaction
//! appends to the matching findings list (deduplicating web entries by
//! URL), raises the confidence score to the best corpus similarity seen so
//! far, and rewrites the bulky tool message down to one line so the
//! transcript's token footprint stays bounded.

use crate::state::ResearchState;
use scour_core::tool::{IssueSearchOutcome, ToolOutput, WebHit, ANSWER_PSEUDO_URL};
use tracing::debug;

/// How many issue hits feed findings per search.
const ISSUE_FINDING_LIMIT: usize = 3;

/// Fold one tool result into the state.
///
/// `call_id` identifies the transcript message to shrink. Counts every
/// delivered result, including disabled/failed payloads — the agent spent a
/// tool invocation either way.
pub fn apply_tool_output(
    state: ResearchState,
    call_id: &str,
    output: &ToolOutput,
) -> ResearchState {
    let mut state = state;
    state.tool_call_count += 1;

    let summary = match output {
        ToolOutput::Corpus(hits) => {
            let best = hits
                .iter()
                .map(|h| h.similarity)
                .fold(0.0f32, f32::max);
            if best > state.confidence {
                debug!(confidence = best, "Corpus confidence raised");
                state.confidence = best;
            }
            for hit in hits {
                state.corp_findings.push(hit.clone());
            }
            format!(
                "Corpus search: {} hits (confidence: {:.2})",
                hits.len(),
                state.confidence
            )
        }

        ToolOutput::Web(hits) => {
            let mut added = 0;
            for hit in hits {
                if hit.url == ANSWER_PSEUDO_URL {
                    continue;
                }
                if hit.url.is_empty() && hit.snippet.is_empty() {
                    continue;
                }
                if url_known(&state.web_findings, &hit.url) {
                    continue;
                }
                state.web_findings.push(hit.clone());
                added += 1;
            }
            let urls: Vec<&str> = state
                .web_findings
                .iter()
                .rev()
                .take(3)
                .map(|f| f.url.as_str())
                .collect();
            format!("Web search: {added} new results - {}", urls.join(", "))
        }

        ToolOutput::Issues(outcome) => match outcome {
            IssueSearchOutcome::Hits(items) => {
                let mut added = 0;
                for item in items.iter().take(ISSUE_FINDING_LIMIT) {
                    if item.url.is_empty() || url_known(&state.web_findings, &item.url) {
                        continue;
                    }
                    let snippet = if item.state.is_empty() {
                        item.title.clone()
                    } else {
                        format!("{} - {}", item.title, item.state)
                    };
                    state.web_findings.push(WebHit {
                        url: item.url.clone(),
                        snippet,
                        content: Some(item.body.clone()),
                    });
                    added += 1;
                }
                format!("Issue search: {} hits, {added} recorded", items.len())
            }
            IssueSearchOutcome::Disabled { reason } => {
                format!("Issue search unavailable: {reason}")
            }
            IssueSearchOutcome::Failed { message } => {
                format!("Issue search failed: {message}")
            }
        },

        ToolOutput::Page(page) => {
            let chars = page.body.chars().count();
            match state
                .web_findings
                .iter_mut()
                .find(|f| f.url == page.url)
            {
                Some(finding) => finding.content = Some(page.body.clone()),
                None => state.web_findings.push(WebHit {
                    url: page.url.clone(),
                    snippet: String::new(),
                    content: Some(page.body.clone()),
                }),
            }
            format!("Fetched page body: {} ({chars} chars)", page.url)
        }

        // Nothing structured to extract; leave the transcript alone
        ToolOutput::Text(_) => return state,
    };

    shrink_tool_message(&mut state, call_id, summary);
    state
}

fn url_known(findings: &[WebHit], url: &str) -> bool {
    !url.is_empty() && findings.iter().any(|f| f.url == url)
}

/// Replace the matching tool message's content with a one-line summary.
fn shrink_tool_message(state: &mut ResearchState, call_id: &str, summary: String) {
    if let Some(message) = state
        .messages
        .iter_mut()
        .rev()
        .find(|m| m.tool_call_id.as_deref() == Some(call_id))
    {
        message.content = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_core::message::Message;
    use scour_core::tool::{CorpusHit, IssueHit, PageText};

    fn state_with_tool_message(call_id: &str) -> ResearchState {
        ResearchState::new("sys", "q")
            .with_tool_message(Message::tool_result(call_id, "a very long raw payload ..."))
    }

    fn corpus_hit(similarity: f32) -> CorpusHit {
        CorpusHit {
            content: "chunk".into(),
            source: "doc.txt".into(),
            page: None,
            similarity,
        }
    }

    fn web_hit(url: &str) -> WebHit {
        WebHit {
            url: url.into(),
            snippet: "snippet".into(),
            content: None,
        }
    }

    #[test]
    fn corpus_results_raise_confidence_to_max() {
        let state = state_with_tool_message("c1");
        let state = apply_tool_output(
            state,
            "c1",
            &ToolOutput::Corpus(vec![corpus_hit(0.6), corpus_hit(0.9), corpus_hit(0.4)]),
        );
        assert_eq!(state.corp_findings.len(), 3);
        assert!((state.confidence - 0.9).abs() < 1e-6);
        assert_eq!(state.tool_call_count, 1);
    }

    #[test]
    fn confidence_never_drops() {
        let state = state_with_tool_message("c1");
        let state = apply_tool_output(state, "c1", &ToolOutput::Corpus(vec![corpus_hit(0.9)]));
        let state = state.with_tool_message(Message::tool_result("c2", "raw"));
        let state = apply_tool_output(state, "c2", &ToolOutput::Corpus(vec![corpus_hit(0.3)]));
        assert!((state.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn tool_message_is_shrunk_to_summary() {
        let state = state_with_tool_message("c1");
        let state = apply_tool_output(state, "c1", &ToolOutput::Corpus(vec![corpus_hit(0.8)]));
        let message = state.messages.last().unwrap();
        assert!(message.content.starts_with("Corpus search: 1 hits"));
        assert!(!message.content.contains("raw payload"));
    }

    #[test]
    fn web_results_dedupe_by_url() {
        let state = state_with_tool_message("w1");
        let state = apply_tool_output(
            state,
            "w1",
            &ToolOutput::Web(vec![web_hit("https://a"), web_hit("https://b")]),
        );
        let state = state.with_tool_message(Message::tool_result("w2", "raw"));
        let state = apply_tool_output(
            state,
            "w2",
            &ToolOutput::Web(vec![web_hit("https://b"), web_hit("https://c")]),
        );
        let urls: Vec<&str> = state.web_findings.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
    }

    #[test]
    fn answer_pseudo_url_is_excluded() {
        let state = state_with_tool_message("w1");
        let state = apply_tool_output(
            state,
            "w1",
            &ToolOutput::Web(vec![
                WebHit {
                    url: ANSWER_PSEUDO_URL.into(),
                    snippet: "synthesized answer".into(),
                    content: None,
                },
                web_hit("https://real"),
            ]),
        );
        assert_eq!(state.web_findings.len(), 1);
        assert_eq!(state.web_findings[0].url, "https://real");
    }

    #[test]
    fn page_body_attaches_to_matching_finding() {
        let state = state_with_tool_message("w1");
        let state = apply_tool_output(state, "w1", &ToolOutput::Web(vec![web_hit("https://a")]));
        let state = state.with_tool_message(Message::tool_result("p1", "huge html text"));
        let state = apply_tool_output(
            state,
            "p1",
            &ToolOutput::Page(PageText {
                url: "https://a".into(),
                body: "full body".into(),
            }),
        );
        assert_eq!(state.web_findings.len(), 1);
        assert_eq!(state.web_findings[0].content.as_deref(), Some("full body"));
        // The page transcript message got summarized too
        assert!(state
            .messages
            .last()
            .unwrap()
            .content
            .starts_with("Fetched page body:"));
    }

    #[test]
    fn page_body_for_unknown_url_appends() {
        let state = state_with_tool_message("p1");
        let state = apply_tool_output(
            state,
            "p1",
            &ToolOutput::Page(PageText {
                url: "https://new".into(),
                body: "body".into(),
            }),
        );
        assert_eq!(state.web_findings.len(), 1);
        assert_eq!(state.web_findings[0].url, "https://new");
    }

    #[test]
    fn issue_hits_append_with_limit_and_dedupe() {
        let hits: Vec<IssueHit> = (0..5)
            .map(|i| IssueHit {
                url: format!("https://github.com/org/repo/issues/{i}"),
                title: format!("Issue {i}"),
                state: "open".into(),
                body: "details".into(),
                number: Some(i),
            })
            .collect();
        let state = state_with_tool_message("i1");
        let state = apply_tool_output(state, "i1", &ToolOutput::Issues(IssueSearchOutcome::Hits(hits)));
        assert_eq!(state.web_findings.len(), 3);
        assert!(state.web_findings[0].snippet.contains("open"));
    }

    #[test]
    fn disabled_issue_search_still_counts_the_call() {
        let state = state_with_tool_message("i1");
        let state = apply_tool_output(
            state,
            "i1",
            &ToolOutput::Issues(IssueSearchOutcome::Disabled {
                reason: "no token".into(),
            }),
        );
        assert_eq!(state.tool_call_count, 1);
        assert!(state.web_findings.is_empty());
        assert!(state
            .messages
            .last()
            .unwrap()
            .content
            .contains("unavailable"));
    }
}
