use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::remote::{GitHubClient, RepoRef, Token};
use crate::sweep::{RepoTarget, SweepPlan, validate};

pub struct AppContext {
    pub config: Config,
    pub dry_run: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Ok(Self {
            config,
            dry_run: cli.dry_run,
        })
    }

    /// Validate the invocation. Config exclusions join `--exclude-branch`.
    pub fn plan(&self, cli: &Cli) -> Result<SweepPlan> {
        let mut exclusions = cli.exclude_branch.clone();
        exclusions.extend(self.config.sweep.exclude.iter().cloned());
        validate(
            &exclusions,
            RepoTarget::Url(&cli.repo_url),
            Some(&cli.max_idle_days),
            &self.config.github.hosts,
        )
    }

    /// Read the token and open the repository.
    pub fn connect(&self, repo: RepoRef) -> Result<GitHubClient> {
        let token = Token::from_env(&self.config.github.token_env)?;
        GitHubClient::connect(repo, &token, &self.config.github)
    }
}
