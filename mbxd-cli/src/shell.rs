//! Interactive menu loop
//!
//! Generic over its input and output so the whole dialogue can be driven
//! from tests. End of input anywhere ends the shell cleanly.

use mbxd_common::services::User;
use mbxd_common::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, info};

use crate::auth::AuthProvider;
use crate::profile::ProfileProvider;

/// Why the shell stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// "Exit" from the welcome menu
    Exit,
    /// "Quit" while logged in
    Quit,
    EndOfInput,
}

enum Welcome {
    LoggedIn(User),
    Exit,
    EndOfInput,
}

enum SessionEnd {
    LoggedOut,
    Quit,
    EndOfInput,
}

pub struct Shell<A, P, R, W> {
    auth: A,
    profile: P,
    input: Lines<R>,
    output: W,
}

impl<A, P, R, W> Shell<A, P, R, W>
where
    A: AuthProvider,
    P: ProfileProvider,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(auth: A, profile: P, input: R, output: W) -> Self {
        Self {
            auth,
            profile,
            input: input.lines(),
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<ShellExit> {
        loop {
            let user = match self.welcome().await? {
                Welcome::LoggedIn(user) => user,
                Welcome::Exit => return Ok(ShellExit::Exit),
                Welcome::EndOfInput => return Ok(ShellExit::EndOfInput),
            };

            match self.session(user).await? {
                SessionEnd::LoggedOut => continue,
                SessionEnd::Quit => return Ok(ShellExit::Quit),
                SessionEnd::EndOfInput => return Ok(ShellExit::EndOfInput),
            }
        }
    }

    async fn welcome(&mut self) -> Result<Welcome> {
        loop {
            self.say("\nWelcome to Musicboxd").await?;
            self.say("1) Log in").await?;
            self.say("2) Create account").await?;
            self.say("3) Exit").await?;
            let Some(choice) = self.prompt("Choose an option: ").await? else {
                return Ok(Welcome::EndOfInput);
            };

            match choice.as_str() {
                "1" => {
                    let Some(identifier) = self.prompt("Username or email: ").await? else {
                        return Ok(Welcome::EndOfInput);
                    };
                    let Some(password) = self.prompt("Password: ").await? else {
                        return Ok(Welcome::EndOfInput);
                    };
                    match self.auth.login(&identifier, &password).await {
                        Ok(user) => {
                            self.say("Logged in successfully.").await?;
                            return Ok(Welcome::LoggedIn(user));
                        }
                        Err(e) => self.say(&e.to_string()).await?,
                    }
                }
                "2" => {
                    let mut fields = Vec::with_capacity(4);
                    for label in ["Username: ", "Email: ", "Password: ", "Confirm password: "] {
                        match self.prompt(label).await? {
                            Some(value) => fields.push(value),
                            None => return Ok(Welcome::EndOfInput),
                        }
                    }
                    match self
                        .auth
                        .create_account(&fields[0], &fields[1], &fields[2], &fields[3])
                        .await
                    {
                        Ok(user) => {
                            self.say("Account created and logged in.").await?;
                            return Ok(Welcome::LoggedIn(user));
                        }
                        Err(e) => self.say(&e.to_string()).await?,
                    }
                }
                "3" => {
                    self.say("Exiting.").await?;
                    return Ok(Welcome::Exit);
                }
                _ => self.say("Invalid option.").await?,
            }
        }
    }

    async fn session(&mut self, user: User) -> Result<SessionEnd> {
        info!("Shell session started for {}", user.username);
        self.render_profile(&user).await?;

        loop {
            self.say("\n1) Refresh profile  2) Logout  3) Quit").await?;
            let Some(choice) = self.prompt("Choose: ").await? else {
                return Ok(SessionEnd::EndOfInput);
            };

            match choice.as_str() {
                "1" => match self.auth.current_user().await {
                    Ok(Some(user)) => self.render_profile(&user).await?,
                    Ok(None) => {
                        self.say("Your session has expired. Please log in again.").await?;
                        return Ok(SessionEnd::LoggedOut);
                    }
                    Err(e) => self.say(&e.to_string()).await?,
                },
                "2" => {
                    match self.auth.logout().await {
                        Ok(()) => self.say("Logged out.").await?,
                        Err(e) => self.say(&e.to_string()).await?,
                    }
                    return Ok(SessionEnd::LoggedOut);
                }
                "3" => {
                    if let Err(e) = self.auth.logout().await {
                        debug!("Logout on quit failed: {}", e);
                    }
                    self.say("Quit.").await?;
                    return Ok(SessionEnd::Quit);
                }
                _ => self.say("Invalid option.").await?,
            }
        }
    }

    async fn render_profile(&mut self, user: &User) -> Result<()> {
        match self.profile.show_profile(user).await {
            Ok(text) => {
                self.output.write_all(text.as_bytes()).await?;
                self.output.flush().await?;
                Ok(())
            }
            Err(e) => self.say(&e.to_string()).await,
        }
    }

    async fn say(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Print `label` and read one trimmed line; `None` at end of input
    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.output.write_all(label.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self
            .input
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}
