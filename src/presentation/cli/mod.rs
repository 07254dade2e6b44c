use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use crate::application::ServerConfig;
use crate::application::retry::{DEFAULT_MAX_RETRIES, RetryPolicy};
use crate::application::services::wallpapers::DEFAULT_MAX_CONCURRENT_TRANSFORMS;
use crate::infrastructure::feed::FEED_URL;

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve a random top-of-the-week wallpaper from a community feed", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(env = "WALLFEED_PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "WALLFEED_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Base URL of the community feed host
    #[arg(long, env = "WALLFEED_FEED_URL", default_value = FEED_URL)]
    pub feed_url: String,

    /// Re-attempts after a failed fetch/transform before answering 500.
    /// Negative values mean a single attempt.
    #[arg(
        long,
        env = "WALLFEED_MAX_RETRIES",
        default_value_t = i64::from(DEFAULT_MAX_RETRIES),
        allow_negative_numbers = true
    )]
    pub max_retries: i64,

    /// Answer 500 on the first failure instead of retrying
    #[arg(long, env = "WALLFEED_NO_RETRY")]
    pub no_retry: bool,

    /// Timeout applied to each feed and image request
    #[arg(long, env = "WALLFEED_UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    #[arg(
        long,
        env = "WALLFEED_MAX_CONCURRENT_TRANSFORMS",
        default_value_t = DEFAULT_MAX_CONCURRENT_TRANSFORMS
    )]
    pub max_concurrent_transforms: usize,
}

impl Cli {
    pub fn into_server_config(self) -> ServerConfig {
        let retry = if self.no_retry {
            RetryPolicy::disabled()
        } else {
            RetryPolicy::from_signed(self.max_retries)
        };

        ServerConfig {
            bind_address: SocketAddr::new(self.host, self.port),
            feed_url: self.feed_url,
            retry,
            upstream_timeout: Duration::from_secs(self.upstream_timeout_secs),
            max_concurrent_transforms: self.max_concurrent_transforms,
        }
    }
}
