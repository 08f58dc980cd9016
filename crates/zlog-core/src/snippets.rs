// ── Integration snippets ──
//
// Middleware templates shown in the Integrations panel. The backend may
// serve its own; anything it leaves blank falls back to a built-in
// template pointed at the configured backend.

use tracing::debug;
use url::Url;
use zlog_api::Snippets;

use crate::backend::Backend;

const BASE_URL_MARKER: &str = "{{BASE_URL}}";

const EXPRESS_TEMPLATE: &str = r"// Express.js middleware
const API_KEY = process.env.ZLOG_API_KEY;
const BASE_URL = '{{BASE_URL}}';

module.exports = function zlog(req, res, next) {
  const start = Date.now();
  res.on('finish', async () => {
    const payload = {
      method: req.method, path: req.originalUrl, status: res.statusCode,
      ip: req.ip, latency_ms: Date.now() - start, message: res.statusMessage
    };
    try {
      await fetch(BASE_URL + '/ingest', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json', 'X-API-Key': API_KEY },
        body: JSON.stringify(payload)
      });
    } catch (e) {}
  });
  next();
};";

const HONO_TEMPLATE: &str = r"// Hono middleware
import { Hono } from 'hono'
const API_KEY = process.env.ZLOG_API_KEY
const BASE_URL = '{{BASE_URL}}'

export const zlog = async (c, next) => {
  const start = Date.now()
  await next()
  const payload = {
    method: c.req.method, path: c.req.path, status: c.res.status,
    ip: c.req.header('x-forwarded-for') || '', latency_ms: Date.now() - start, message: ''
  }
  try {
    await fetch(BASE_URL + '/ingest', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json', 'X-API-Key': API_KEY },
      body: JSON.stringify(payload)
    })
  } catch (e) {}
}";

/// Which middleware a snippet targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetKind {
    Express,
    Hono,
}

impl SnippetKind {
    pub const ALL: [Self; 2] = [Self::Express, Self::Hono];

    pub fn label(self) -> &'static str {
        match self {
            Self::Express => "Express",
            Self::Hono => "Hono",
        }
    }
}

/// Snippet text ready for display, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSnippets {
    pub express: String,
    pub hono: String,
}

impl ResolvedSnippets {
    /// Built-in templates only.
    pub fn fallback(base_url: &Url) -> Self {
        Self::resolve(None, base_url)
    }

    /// Prefer served text; fill blanks from the templates.
    pub fn resolve(served: Option<&Snippets>, base_url: &Url) -> Self {
        let pick = |served: Option<&String>, template: &str| {
            served
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| render_template(template, base_url))
        };
        Self {
            express: pick(served.and_then(|s| s.express.as_ref()), EXPRESS_TEMPLATE),
            hono: pick(served.and_then(|s| s.hono.as_ref()), HONO_TEMPLATE),
        }
    }

    pub fn get(&self, kind: SnippetKind) -> &str {
        match kind {
            SnippetKind::Express => &self.express,
            SnippetKind::Hono => &self.hono,
        }
    }
}

/// Fetch served snippets, falling back to the templates on any failure.
pub async fn load_snippets<B: Backend>(backend: &B, base_url: &Url) -> ResolvedSnippets {
    match backend.fetch_snippets().await {
        Ok(served) => ResolvedSnippets::resolve(Some(&served), base_url),
        Err(e) => {
            debug!(error = %e, "snippets unavailable, using templates");
            ResolvedSnippets::fallback(base_url)
        }
    }
}

fn render_template(template: &str, base_url: &Url) -> String {
    template.replace(BASE_URL_MARKER, base_url.as_str().trim_end_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://logs.internal:8000/").unwrap()
    }

    #[test]
    fn fallback_substitutes_base_url() {
        let snippets = ResolvedSnippets::fallback(&base());
        assert!(
            snippets
                .express
                .contains("const BASE_URL = 'http://logs.internal:8000';")
        );
        assert!(snippets.hono.contains("'X-API-Key': API_KEY"));
        assert!(!snippets.hono.contains(BASE_URL_MARKER));
    }

    #[test]
    fn served_text_wins_and_blanks_fall_back() {
        let served = Snippets {
            express: Some("// served".into()),
            hono: Some("   ".into()),
        };
        let snippets = ResolvedSnippets::resolve(Some(&served), &base());
        assert_eq!(snippets.get(SnippetKind::Express), "// served");
        assert!(snippets.get(SnippetKind::Hono).starts_with("// Hono middleware"));
    }
}
