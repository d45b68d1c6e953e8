//! Offline stub dataset for web search and page fetches.
//!
//! When no search API key is configured, `web_search` serves these entries
//! and `fetch_page` serves their bodies. The data is grouped by topic so an
//! offline demo still exercises the full search → fetch → compact path.

/// A canned web page used in offline mode.
#[derive(Debug, Clone, Copy)]
pub struct StubPage {
    pub url: &'static str,
    pub snippet: &'static str,
    pub content: &'static str,
}

const DEFAULT_GROUP: &[StubPage] = &[
    StubPage {
        url: "https://example.com/reports/2024-global-trends-in-ai",
        snippet: "Generative AI budgets are projected to reach a third of total AI spend as executives balance regulation and ROI.",
        content: "A 2024 industry report highlights growing budgets for generative AI, with \
                  organizations balancing regulatory compliance and return on investment. Common \
                  themes include governance frameworks, data security, and phased rollouts across \
                  business functions.",
    },
    StubPage {
        url: "https://example.com/insights/state-of-generative-ai-in-enterprise",
        snippet: "Executives pursue innovation while preparing governance playbooks that satisfy emerging global AI regulations.",
        content: "Enterprises are formalizing AI governance playbooks and risk controls while \
                  rolling out generative AI pilots. Key practices: data anonymization, model \
                  evaluation, and cross-functional oversight.",
    },
    StubPage {
        url: "https://example.com/legal/global-ai-regulatory-update",
        snippet: "New transparency requirements oblige deployers to disclose training data practices within months of enforcement.",
        content: "Regulatory updates emphasize transparency and accountability, including \
                  obligations for providers and deployers around disclosures and incident \
                  reporting.",
    },
];

const REQUEST_GROUP: &[StubPage] = &[
    StubPage {
        url: "https://intra.example.com/ai-usage-guideline",
        snippet: "Approval takes up to three business days after filing through the internal portal. Prompts containing customer data are prohibited.",
        content: "Internal guidelines prohibit entering personal or confidential information \
                  into prompts; anonymization and masking are mandatory. Requests are filed \
                  through the IT department portal and approved after a risk assessment and \
                  audit-logging setup.",
    },
    StubPage {
        url: "https://intra.example.com/ai-request-flow",
        snippet: "The IT department reviews each request, performs a risk assessment, and configures log auditing.",
        content: "The request flow has four stages: file, review, approve, start using. \
                  Operation begins after audit logging is enabled and an owner signs off.",
    },
];

/// Pick the stub group matching a query. Application/request-procedure
/// queries get the intranet group; everything else the default group.
pub fn offline_results(query: &str) -> &'static [StubPage] {
    let q = query.to_lowercase();
    if q.contains("申請") || q.contains("request") || q.contains("application") || q.contains("approval")
    {
        REQUEST_GROUP
    } else {
        DEFAULT_GROUP
    }
}

/// Look up a stub page body by URL, across all groups.
pub fn offline_page_body(url: &str) -> Option<&'static str> {
    DEFAULT_GROUP
        .iter()
        .chain(REQUEST_GROUP.iter())
        .find(|page| page.url == url)
        .map(|page| page.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_queries_get_intranet_group() {
        let results = offline_results("How do I file a usage request?");
        assert!(results.iter().all(|p| p.url.starts_with("https://intra.")));
    }

    #[test]
    fn other_queries_get_default_group() {
        let results = offline_results("global AI regulation trends 2024");
        assert_eq!(results.len(), 3);
        assert!(results[0].url.contains("2024-global-trends"));
    }

    #[test]
    fn page_body_lookup_spans_groups() {
        assert!(offline_page_body("https://intra.example.com/ai-request-flow").is_some());
        assert!(offline_page_body("https://example.com/legal/global-ai-regulatory-update").is_some());
        assert!(offline_page_body("https://nowhere.example.com/").is_none());
    }
}
