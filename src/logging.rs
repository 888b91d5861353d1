use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::{Method, StatusCode};

use crate::error::Result;

/// A unique identifier for a particular outgoing request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Log a request as it leaves.
pub(crate) fn log_request(id: RequestId, method: &Method, url: &str) {
    info!("->req{id} {method} {url}");
}

/// Log the status line of a response, at a level matching its class.
pub(crate) fn log_response(id: RequestId, status: StatusCode, operation: &str) {
    let log_msg = format!("<-rsp{id} {status} {operation}");
    if status.is_server_error() {
        error!("{log_msg}");
    } else if status.is_client_error() {
        warn!("{log_msg}");
    } else {
        info!("{log_msg}");
    }
}

/// Run one API call, logging any failure with the operation that caused it.
/// The error itself is handed back untouched.
pub(crate) async fn logged<T, F>(id: RequestId, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let result = call.await;
    if let Err(err) = &result {
        error!("request {id} ({operation}) failed: {err}");
    }
    result
}

/// Initialise logging for binaries: use `log4rs.yaml` if it loads, otherwise
/// say why on stderr and log to the console at `info`.
pub fn init(config_path: &str) -> std::result::Result<(), log::SetLoggerError> {
    match log4rs::init_file(config_path, Default::default()) {
        Ok(()) => Ok(()),
        Err(err) => {
            use log::LevelFilter;
            use log4rs::{
                append::console::{ConsoleAppender, Target},
                config::{Appender, Config, Root},
                encode::pattern::PatternEncoder,
            };

            eprintln!("{}", fallback_notice(config_path, &err));

            let stderr = ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {m}{n}")))
                .build();
            let config = Config::builder()
                .appender(Appender::builder().build("stderr", Box::new(stderr)))
                .build(Root::builder().appender("stderr").build(LevelFilter::Info))
                .expect("static logging config is valid");
            log4rs::init_config(config).map(|_| ())
        }
    }
}

fn fallback_notice(config_path: &str, err: &dyn std::fmt::Display) -> String {
    format!("Could not load logging config {config_path:?} ({err}); logging to the console instead")
}
