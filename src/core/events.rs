/// Signals delivered to the front end over the session's event channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    /// The selected provider needs an API key and none is stored.
    CredentialMissing {
        provider_id: String,
        provider_display_name: String,
    },
    /// A dispatch started (`true`) or finished (`false`).
    BusyChanged(bool),
    /// Reply text for the outstanding turn, real or fallback.
    Reply(String),
}
