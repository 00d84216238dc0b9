use axum::http::Method;

use crate::config::GatewayConfig;

/// Local authorization applied before any upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// No local gate; the upstream enforces its own access control.
    Open,
    /// A syntactically valid bearer token must be present (presence only).
    BearerRequired,
}

/// Which configured backend a platform family forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    SpiderApi,
    WechatApi,
}

/// One platform family of the proxy surface. The dispatcher is a single
/// parameterized pipeline; everything that differs between families lives
/// in these rows.
#[derive(Debug)]
pub struct PlatformRoute {
    /// Path segment after `/api/`, e.g. `douyin` in `/api/douyin/videos`.
    pub prefix: &'static str,

    pub upstream: UpstreamKind,

    /// Prefix inserted in front of the wildcard remainder on the upstream
    /// side. Empty for families whose base URL already encodes the API root.
    pub rewrite_prefix: &'static str,

    pub auth: AuthStrategy,

    /// Whether the service X-Api-Key credential is attached to upstream calls.
    pub inject_api_key: bool,

    /// Wildcard remainders served by the byte-stream passthrough (GET only).
    pub streaming_paths: &'static [&'static str],
}

pub static PLATFORMS: &[PlatformRoute] = &[
    PlatformRoute {
        prefix: "accounts",
        upstream: UpstreamKind::SpiderApi,
        rewrite_prefix: "/api/v1",
        auth: AuthStrategy::Open,
        inject_api_key: true,
        streaming_paths: &[],
    },
    PlatformRoute {
        prefix: "douyin",
        upstream: UpstreamKind::SpiderApi,
        rewrite_prefix: "/api/v1/douyin",
        auth: AuthStrategy::Open,
        inject_api_key: true,
        streaming_paths: &["proxy/video"],
    },
    PlatformRoute {
        prefix: "xiaohongshu",
        upstream: UpstreamKind::SpiderApi,
        rewrite_prefix: "/api/v1/xiaohongshu",
        auth: AuthStrategy::Open,
        inject_api_key: true,
        streaming_paths: &[],
    },
    PlatformRoute {
        prefix: "bilibili",
        upstream: UpstreamKind::SpiderApi,
        rewrite_prefix: "/api/v1/bilibili",
        auth: AuthStrategy::Open,
        inject_api_key: true,
        streaming_paths: &[],
    },
    PlatformRoute {
        prefix: "zhihu",
        upstream: UpstreamKind::SpiderApi,
        rewrite_prefix: "/api/v1/zhihu",
        auth: AuthStrategy::Open,
        inject_api_key: true,
        streaming_paths: &[],
    },
    PlatformRoute {
        prefix: "wechat",
        upstream: UpstreamKind::WechatApi,
        rewrite_prefix: "",
        auth: AuthStrategy::BearerRequired,
        inject_api_key: false,
        streaming_paths: &[],
    },
];

impl PlatformRoute {
    /// Upstream base URL for this family.
    pub fn base_url<'a>(&self, config: &'a GatewayConfig) -> &'a str {
        match self.upstream {
            UpstreamKind::SpiderApi => &config.spider_api_base_url,
            UpstreamKind::WechatApi => &config.wechat_api_base_url,
        }
    }

    /// Map the wildcard remainder to the upstream path.
    pub fn rewrite_path(&self, rest: &str) -> String {
        format!("{}/{}", self.rewrite_prefix, rest.trim_start_matches('/'))
    }

    pub fn is_streaming(&self, method: &Method, rest: &str) -> bool {
        *method == Method::GET && self.streaming_paths.contains(&rest)
    }
}
