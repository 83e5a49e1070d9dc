/// Message type discriminator (bytes 32..34 of the header).
///
/// Only the kinds a client needs to recognise without reading payloads are
/// named; everything else is preserved in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    GetService,
    StateService,
    Acknowledgement,
    EchoRequest,
    EchoResponse,
    StateUnhandled,
    Other(u16),
}

impl MessageKind {
    pub fn is_ack(self) -> bool {
        self == MessageKind::Acknowledgement
    }
}

impl From<u16> for MessageKind {
    fn from(value: u16) -> Self {
        match value {
            2 => MessageKind::GetService,
            3 => MessageKind::StateService,
            45 => MessageKind::Acknowledgement,
            58 => MessageKind::EchoRequest,
            59 => MessageKind::EchoResponse,
            223 => MessageKind::StateUnhandled,
            other => MessageKind::Other(other),
        }
    }
}

impl From<MessageKind> for u16 {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::GetService => 2,
            MessageKind::StateService => 3,
            MessageKind::Acknowledgement => 45,
            MessageKind::EchoRequest => 58,
            MessageKind::EchoResponse => 59,
            MessageKind::StateUnhandled => 223,
            MessageKind::Other(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_is_45() {
        assert_eq!(MessageKind::from(45), MessageKind::Acknowledgement);
        assert!(MessageKind::from(45).is_ack());
        assert!(!MessageKind::StateService.is_ack());
    }

    #[test]
    fn unknown_kinds_are_preserved() {
        let kind = MessageKind::from(117);
        assert_eq!(kind, MessageKind::Other(117));
        assert_eq!(u16::from(kind), 117);
    }
}
