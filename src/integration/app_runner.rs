use color_eyre::eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;

use crate::{
    infrastructure::{config::Config, relay::NostrRelay, stdin::spawn_stdin_reader},
    integration::{
        console::Console,
        session::{ChatSession, SessionConfig},
    },
};

/// Wires a [`ChatSession`] to the real relay, stdin, stdout and Ctrl-C.
pub struct AppRunner {
    session: ChatSession<NostrRelay>,
    console: Console,
    cancel_token: CancellationToken,
}

impl AppRunner {
    pub async fn new(config: &Config) -> Result<Self> {
        let session_config = SessionConfig::from(config);
        let session = ChatSession::open(&session_config, |keys, url, timeout| async move {
            NostrRelay::connect(keys, &url, timeout).await
        })
        .await?;

        Ok(Self {
            session,
            console: Console::stdout(),
            cancel_token: CancellationToken::new(),
        })
    }

    pub async fn run(self) -> Result<()> {
        let input = spawn_stdin_reader().wrap_err("failed to start reading input")?;

        let conversation = self.session.conversation();
        self.console.notice(format!(
            "Chatting with {} as {}",
            conversation.peer(),
            conversation.identity().npub()
        ));

        let cancel_token = self.cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupted");
                cancel_token.cancel();
            }
        });

        self.session
            .run(input, self.console, self.cancel_token)
            .await
    }
}
