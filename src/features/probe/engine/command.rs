use crate::config::{Address, ProbeConfig, ProbeMode};
use crate::probe::{Platform, ProbeRequest};
use std::fmt;
use std::io;
use std::process::{Child, Command, Stdio};

/// Program and arguments of one probe process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProbeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProbeCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Ping runs until stopped unless `requests` is set; zero-valued
    /// options are left to the platform default.
    pub fn ping(platform: Platform, address: Address, config: &ProbeConfig) -> Self {
        let mut args = Vec::new();
        match platform {
            Platform::Unix => {
                if config.requests > 0 {
                    args.extend(["-c".to_string(), config.requests.to_string()]);
                }
                if config.timeout > 0 {
                    args.extend(["-W".to_string(), config.timeout.to_string()]);
                }
                if config.size > 0 {
                    args.extend(["-s".to_string(), config.size.to_string()]);
                }
            }
            Platform::Windows => {
                if config.requests > 0 {
                    args.extend(["-n".to_string(), config.requests.to_string()]);
                } else {
                    args.push("-t".to_string());
                }
                if config.timeout > 0 {
                    args.extend(["-w".to_string(), config.timeout.to_string()]);
                }
                if config.size > 0 {
                    args.extend(["-l".to_string(), config.size.to_string()]);
                }
            }
        }
        args.push(address.to_string());
        Self::new("ping", args)
    }

    pub fn traceroute(platform: Platform, address: Address) -> Self {
        let program = match platform {
            Platform::Unix => "traceroute",
            Platform::Windows => "tracert",
        };
        Self::new(program, vec![address.to_string()])
    }

    /// Starts the process with both output streams piped. On unix the
    /// child leads its own process group so a kill reaches its children.
    pub fn spawn(&self) -> io::Result<Child> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command.spawn()
    }
}

impl fmt::Display for ProbeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Turns a probe request into the process to run.
pub trait CommandFactory: Send + Sync {
    fn build(&self, request: &ProbeRequest, config: &ProbeConfig) -> ProbeCommand;

    /// Output dialect of the built commands.
    fn platform(&self) -> Platform;
}

/// The host's own `ping` and `traceroute`/`tracert`.
#[derive(Clone, Copy, Debug)]
pub struct SystemCommands {
    platform: Platform,
}

impl SystemCommands {
    pub fn host() -> Self {
        Self {
            platform: Platform::host(),
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }
}

impl CommandFactory for SystemCommands {
    fn build(&self, request: &ProbeRequest, config: &ProbeConfig) -> ProbeCommand {
        match request.mode {
            ProbeMode::Ping => ProbeCommand::ping(self.platform, request.address, config),
            ProbeMode::Traceroute => ProbeCommand::traceroute(self.platform, request.address),
        }
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
