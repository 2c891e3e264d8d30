use log::info;
use simple_signal::{self, Signal};
use tokio_util::sync::CancellationToken;

/// Signals that end the process cleanly. Everything else keeps its default
/// disposition.
pub const TERMINATION_SIGNALS: [Signal; 4] = [Signal::Hup, Signal::Int, Signal::Quit, Signal::Term];

/// Returns a token that is cancelled once a termination signal arrives.
pub fn setup_signals() -> CancellationToken {
    let cancellation_token = CancellationToken::new();

    simple_signal::set_handler(&TERMINATION_SIGNALS, {
        let cancellation_token_clone = cancellation_token.clone();
        move |signals| {
            info!("Received {:?}", signals);
            cancellation_token_clone.cancel();
        }
    });

    cancellation_token
}
