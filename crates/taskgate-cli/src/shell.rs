//! Interactive shell wiring the session layer together.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use taskgate_core::api::ApiClient;
use taskgate_core::auth::{CookieFile, CookieJar, SessionStore};
use taskgate_core::config::Config;
use taskgate_core::router::{
    spawn_redirect_listener, NavigationGuard, RouteTable, Router, HOME_PATH, LOGIN_PATH,
};

use crate::command::{Command, HELP};

pub struct Shell {
    config: Config,
    jar: Arc<CookieJar>,
    cookies: CookieFile,
    session: Arc<SessionStore>,
    router: Arc<Router>,
    listener: JoinHandle<()>,
}

impl Shell {
    /// Build the client, session and router from configuration and saved cookies.
    /// Must be called inside the tokio runtime.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        }
        .with_env_overrides();

        let base_url = config.api_base()?;
        debug!(base_url = %base_url, "API base resolved");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let cookies = CookieFile::new(cache_dir);

        let jar = Arc::new(CookieJar::default());
        match cookies.load_into(&jar) {
            Ok(restored) => debug!(restored, "Cookie store loaded"),
            Err(e) => warn!(error = %e, "Failed to load saved cookies"),
        }

        let api = ApiClient::new(&base_url, Arc::clone(&jar))?;

        let events = api.subscribe();
        let session = Arc::new(SessionStore::new(api));
        let guard = NavigationGuard::new(Arc::clone(&session), RouteTable::application());
        let router = Arc::new(Router::new(guard));
        let listener = spawn_redirect_listener(Arc::clone(&router), events);

        Ok(Self {
            config,
            jar,
            cookies,
            session,
            router,
            listener,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("Connecting to {}", self.session.api().base_url());
        self.navigate(HOME_PATH).await;
        self.print_status();
        println!("Type `help` for commands.");

        loop {
            print!("{}> ", self.router.current().unwrap_or_default());
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let keep_going = match Command::parse(&line) {
                Ok(command) => self.execute(command).await?,
                Err(message) => {
                    println!("{}", message);
                    true
                }
            };

            self.save_cookies();
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    pub fn shutdown(&self) {
        self.listener.abort();
        self.save_cookies();
    }

    /// Run one command. Returns false when the shell should exit.
    async fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Login(name) => self.login(name).await?,
            Command::Register(name) => self.register(name).await?,
            Command::Logout => {
                self.session.logout().await;
                println!("Logged out.");
                self.navigate(LOGIN_PATH).await;
            }
            Command::Me => match self.session.fetch_user().await {
                Ok(user) => println!("{}", serde_json::to_string_pretty(user.as_json())?),
                Err(e) => println!("Could not load user: {}", e),
            },
            Command::WhoAmI => self.print_status(),
            Command::Go(path) => self.navigate(&path).await,
            Command::Get(endpoint) => {
                match self.session.api().get::<serde_json::Value>(&endpoint).await {
                    Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                    Err(e) => println!("Request failed: {}", e),
                }
            }
            Command::Where => {
                println!("{}", self.router.current().unwrap_or_else(|| "(nowhere)".to_string()))
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn login(&mut self, name: Option<String>) -> Result<()> {
        let login = self.resolve_login(name)?;
        let security_key = prompt_security_key()?;

        match self.session.login(&login, &security_key).await {
            Ok(()) => {
                println!("Login successful!");
                self.config.last_login = Some(login);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.navigate(HOME_PATH).await;
            }
            Err(failure) => println!("Login failed: {}", failure),
        }
        Ok(())
    }

    async fn register(&mut self, name: Option<String>) -> Result<()> {
        let login = self.resolve_login(name)?;
        let security_key = prompt_security_key()?;

        match self.session.register(&login, &security_key).await {
            Ok(user) => println!("Registered {}. You can log in now.", user.display_name()),
            Err(failure) => println!("Registration failed: {}", failure),
        }
        Ok(())
    }

    fn resolve_login(&self, name: Option<String>) -> Result<String> {
        if let Some(name) = name {
            return Ok(name);
        }
        match &self.config.last_login {
            Some(last) => {
                let entered = prompt(&format!("Login [{}]: ", last))?;
                Ok(if entered.is_empty() { last.clone() } else { entered })
            }
            None => prompt("Login: "),
        }
    }

    async fn navigate(&self, path: &str) {
        match self.router.push(path).await {
            Ok(location) if location != path => println!("Redirected to {}", location),
            Ok(_) => {}
            Err(e) => println!("Navigation failed: {}", e),
        }
    }

    fn print_status(&self) {
        let session = self.session.snapshot();
        match session.user() {
            Some(user) if session.is_logged_in() => {
                println!("Signed in as {}", user.display_name())
            }
            _ => println!("Not signed in"),
        }
        let forced = self.router.forced_redirects();
        if forced > 0 {
            println!("Session expired {} time(s) this run", forced);
        }
    }

    fn save_cookies(&self) {
        if let Err(e) = self.cookies.save_from(&self.jar) {
            warn!(error = %e, "Failed to save cookies");
        } else {
            debug!("Cookies saved");
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_security_key() -> Result<String> {
    let key = rpassword::prompt_password("Security key: ").context("Failed to read security key")?;
    Ok(key.trim().to_string())
}
