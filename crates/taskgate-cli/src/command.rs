/// A line typed into the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<String>),
    Register(Option<String>),
    Logout,
    Me,
    WhoAmI,
    Go(String),
    Get(String),
    Where,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  login [name]      log in (prompts for the security key)
  register [name]   create an account
  logout            end the session
  me                reload the current user from the backend
  whoami            show the session state
  go <path>         navigate to a route, e.g. `go /`
  get <endpoint>    GET an API endpoint and print the JSON, e.g. `get /tasks`
  where             show the current location
  help              show this help
  quit              exit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err("Empty command".to_string());
        };
        let arg = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(format!("Too many arguments for `{}`", word));
        }

        match (word, arg) {
            ("login", name) => Ok(Command::Login(name)),
            ("register", name) => Ok(Command::Register(name)),
            ("logout", None) => Ok(Command::Logout),
            ("me", None) => Ok(Command::Me),
            ("whoami", None) => Ok(Command::WhoAmI),
            ("go", Some(path)) => Ok(Command::Go(path)),
            ("go", None) => Err("Usage: go <path>".to_string()),
            ("get", Some(endpoint)) => Ok(Command::Get(endpoint)),
            ("get", None) => Err("Usage: get <endpoint>".to_string()),
            ("where", None) => Ok(Command::Where),
            ("help" | "?", None) => Ok(Command::Help),
            ("quit" | "exit", None) => Ok(Command::Quit),
            (word, Some(_)) if ["logout", "me", "whoami", "where", "help", "quit"].contains(&word) => {
                Err(format!("`{}` takes no arguments", word))
            }
            (word, _) => Err(format!("Unknown command `{}` (try `help`)", word)),
        }
    }
}
