//! Command handlers.
//!
//! `App` wires the core services around one `SessionStore` and renders their
//! results for the terminal. Errors from the auth service and catalog are
//! shown with their user-facing message.

use std::future::Future;
use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::debug;

use vidlearn_core::{
    ApiClient, AuthService, Catalog, Config, SessionPoller, SessionStatus, SessionStore, Video,
};

pub struct App {
    config: Config,
    session: SessionStore,
    auth: AuthService,
    catalog: Catalog,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let session = SessionStore::from_config(&config)?;
        let api = ApiClient::from_config(&config, session.clone())?;
        debug!(base_url = %api.base_url(), "API client ready");

        Ok(Self {
            auth: AuthService::new(api.clone()),
            catalog: Catalog::new(api),
            session,
            config,
        })
    }

    fn password_or_prompt(password: Option<String>) -> Result<String> {
        match password {
            Some(password) => Ok(password),
            None => Ok(rpassword::prompt_password("Password: ")?),
        }
    }

    pub async fn signup(&self, name: &str, email: &str, password: Option<String>) -> Result<()> {
        let password = Self::password_or_prompt(password)?;
        match self.auth.signup(name, email, &password).await {
            Ok(_) => {
                println!("Account created successfully! Please login.");
                Ok(())
            }
            Err(e) => bail!("{}", e.message()),
        }
    }

    pub async fn login(&self, email: &str, password: Option<String>) -> Result<()> {
        let password = Self::password_or_prompt(password)?;
        match self.auth.login(email, &password).await {
            Ok(user) => {
                println!("Logged in as {} <{}>", user.display_name(), user.display_email());
                Ok(())
            }
            Err(e) => bail!("{}", e.message()),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await;
        println!("Logged out");
        Ok(())
    }

    pub async fn whoami(&self, remote: bool) -> Result<()> {
        let profile = if remote {
            match self.auth.get_profile().await {
                Ok(profile) => Some(profile),
                Err(e) => bail!("{}", e.message()),
            }
        } else {
            self.auth.cached_profile().await
        };

        let logged_in = self.session.is_logged_in().await;
        match profile {
            Some(profile) => {
                println!("Name:  {}", profile.display_name());
                println!("Email: {}", profile.display_email());
                if !logged_in {
                    println!("(cached profile, not logged in)");
                }
            }
            None if logged_in => println!("Logged in, no cached profile"),
            None => println!("Not logged in"),
        }
        Ok(())
    }

    pub async fn videos(&self, json: bool) -> Result<()> {
        let videos = self.load_videos().await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&videos)?);
            return Ok(());
        }

        if videos.is_empty() {
            println!("No videos available");
            return Ok(());
        }
        for video in &videos {
            println!("{:<12} {}", video.id, video.title);
            if !video.description.is_empty() {
                println!("{:<12} {}", "", video.description);
            }
        }
        Ok(())
    }

    pub async fn play(&self, id: &str) -> Result<()> {
        let videos = self.load_videos().await?;
        let Some(video) = videos.into_iter().find(|v| v.id == id) else {
            bail!("No video with id '{}'", id);
        };

        match self.catalog.stream(&video).await {
            Ok(stream) => {
                println!("Title:    {}", video.title);
                println!("Stream:   {}", stream.url);
                println!("Embed id: {}", stream.embed_id);
                println!("Watch:    {}", stream.watch_url());
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Stream resolution failed");
                bail!("{}", e.user_message())
            }
        }
    }

    pub async fn watch(&self) -> Result<()> {
        println!(
            "Watching session every {}s (Ctrl+C to stop)",
            self.config.poll_interval().as_secs()
        );
        let stop = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        self.watch_until(&mut io::stdout(), stop).await
    }

    /// Print the current state, then every change, until `stop` resolves
    async fn watch_until(
        &self,
        out: &mut impl Write,
        stop: impl Future<Output = ()>,
    ) -> Result<()> {
        let poller = SessionPoller::from_config(&self.config, self.session.clone());
        poller.check().await;
        let poller = poller.spawn();
        let mut status = poller.subscribe();

        let current = *status.borrow_and_update();
        print_status(out, &current)?;

        tokio::pin!(stop);
        loop {
            tokio::select! {
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *status.borrow_and_update();
                    print_status(out, &current)?;
                }
                _ = &mut stop => break,
            }
        }

        poller.stop();
        Ok(())
    }

    pub fn show_config(&self, save: bool) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        if save {
            self.config.save()?;
            println!("Saved to {}", Config::config_path()?.display());
        }
        Ok(())
    }

    async fn load_videos(&self) -> Result<Vec<Video>> {
        match self.catalog.videos().await {
            Ok(videos) => Ok(videos),
            Err(e) => {
                debug!(error = %e, "Dashboard load failed");
                bail!("{}", e.user_message())
            }
        }
    }
}

fn print_status(out: &mut impl Write, status: &SessionStatus) -> io::Result<()> {
    writeln!(out, "{} {:?}", status.since.format("%H:%M:%S"), status.state)?;
    out.flush()
}
