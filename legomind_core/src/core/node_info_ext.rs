//! Logging through the optional context a node receives in `tick`
//!
//! ```ignore
//! ctx.log_debug("no echo"); // no-op when the worker passed None
//! ```

use super::NodeInfo;

/// Log helpers on `Option<&mut NodeInfo>` that do nothing for `None`
pub trait NodeInfoExt {
    fn log_debug(&mut self, message: &str);
    fn log_info(&mut self, message: &str);
    fn log_warning(&mut self, message: &str);
    fn log_error(&mut self, message: &str);
}

macro_rules! forward_to_context {
    ($($method:ident),+) => {
        $(
            #[inline]
            fn $method(&mut self, message: &str) {
                if let Some(ctx) = self.as_deref_mut() {
                    ctx.$method(message);
                }
            }
        )+
    };
}

impl NodeInfoExt for Option<&mut NodeInfo> {
    forward_to_context!(log_debug, log_info, log_warning, log_error);
}
