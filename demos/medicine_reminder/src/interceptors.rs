//! Request and response logging.

use parley::alexa::{SkillRequestInterceptor, SkillResponseInterceptor};
use parley::core::InterceptorError;
use tracing::info;

/// Logs every incoming request envelope as JSON.
pub fn request_logger() -> SkillRequestInterceptor {
    SkillRequestInterceptor::new("LoggingRequestInterceptor", |ctx| {
        let json = serde_json::to_string(ctx.request())
            .map_err(|e| InterceptorError::with_source("failed to serialize request", e))?;
        info!(request = %json, "Request received");
        Ok(())
    })
}

/// Logs every outgoing response envelope as JSON.
pub fn response_logger() -> SkillResponseInterceptor {
    SkillResponseInterceptor::new("LoggingResponseInterceptor", |_ctx, response| {
        let json = serde_json::to_string(response)
            .map_err(|e| InterceptorError::with_source("failed to serialize response", e))?;
        info!(response = %json, "Response generated");
        Ok(())
    })
}
