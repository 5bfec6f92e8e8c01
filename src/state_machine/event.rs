//! Events that can occur in a session

use crate::transport::{ChatResponse, CustomerRecord, TransportError};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User actions
    MessageSubmitted {
        text: String,
    },
    FormSubmitted {
        record: CustomerRecord,
    },
    FormCancelled,

    // Transport completions
    ReplyReceived {
        response: ChatResponse,
    },
    ReplyFailed {
        error: TransportError,
    },
    RecordAccepted,
    RecordRejected {
        error: TransportError,
    },
}
