use crate::config::NodeConfig;
use crate::domain::address::Address;
use crate::domain::amount::TokenAmount;
use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec, IoMode};
use crate::error::{FundingError, Result};
use tracing::debug;

pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)(uint256)";
pub const ALLOWANCE_SIGNATURE: &str = "allowance(address,address)(uint256)";

/// Builds node commands and runs them through a `CommandRunner`.
///
/// Reads return parsed amounts and treat a non-zero exit as an error.
/// Writes return the raw `CommandOutput`; the caller decides what a
/// failed exit means.
pub struct NodeClient<'a> {
    runner: &'a dyn CommandRunner,
    node: &'a NodeConfig,
}

impl<'a> NodeClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, node: &'a NodeConfig) -> Self {
        Self { runner, node }
    }

    fn base(&self, subcommand: &str) -> CommandSpec {
        CommandSpec::new(&self.node.program)
            .arg(subcommand)
            .arg("--rpc-url")
            .arg(&self.node.rpc_url)
    }

    /// State-mutating commands stream their output when the node config
    /// asks for it; reads always capture, since their stdout is parsed.
    fn write_base(&self, subcommand: &str) -> CommandSpec {
        let io = if self.node.stream_writes {
            IoMode::Inherit
        } else {
            IoMode::Capture
        };
        self.base(subcommand).io(io)
    }

    pub fn impersonate_command(&self, account: &Address) -> CommandSpec {
        self.write_base("rpc")
            .arg(&self.node.impersonate_method)
            .arg(account.as_str())
    }

    pub fn approve_command(
        &self,
        owner: &Address,
        spender: &Address,
        amount: TokenAmount,
    ) -> CommandSpec {
        self.write_base("send")
            .args(["--unlocked", "--from", owner.as_str()])
            .arg(self.node.token.as_str())
            .arg(APPROVE_SIGNATURE)
            .arg(spender.as_str())
            .arg(amount.to_string())
    }

    pub fn transfer_command(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> CommandSpec {
        self.write_base("send")
            .args(["--unlocked", "--from", from.as_str()])
            .arg(self.node.token.as_str())
            .arg(TRANSFER_SIGNATURE)
            .arg(to.as_str())
            .arg(amount.to_string())
    }

    pub fn balance_command(&self, owner: &Address) -> CommandSpec {
        self.base("call")
            .arg(self.node.token.as_str())
            .arg(BALANCE_OF_SIGNATURE)
            .arg(owner.as_str())
    }

    pub fn allowance_command(&self, owner: &Address, spender: &Address) -> CommandSpec {
        self.base("call")
            .arg(self.node.token.as_str())
            .arg(ALLOWANCE_SIGNATURE)
            .arg(owner.as_str())
            .arg(spender.as_str())
    }

    pub async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "running node command");
        self.runner.run(spec).await
    }

    pub async fn balance_of(&self, owner: &Address) -> Result<TokenAmount> {
        self.read(&self.balance_command(owner)).await
    }

    pub async fn allowance(&self, owner: &Address, spender: &Address) -> Result<TokenAmount> {
        self.read(&self.allowance_command(owner, spender)).await
    }

    async fn read(&self, spec: &CommandSpec) -> Result<TokenAmount> {
        let output = self.execute(spec).await?;
        if !output.is_success() {
            return Err(FundingError::CommandFailed {
                command: spec.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        TokenAmount::from_output(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_IMPERSONATE_METHOD, DEFAULT_PROGRAM};
    use async_trait::async_trait;

    struct Fixed(CommandOutput);

    #[async_trait]
    impl CommandRunner for Fixed {
        async fn run(&self, _spec: &CommandSpec) -> Result<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    fn node() -> NodeConfig {
        NodeConfig {
            rpc_url: "http://node:8545".to_string(),
            token: "0x00000000000000000000000000000000000000aa".parse().unwrap(),
            program: DEFAULT_PROGRAM.to_string(),
            impersonate_method: DEFAULT_IMPERSONATE_METHOD.to_string(),
            stream_writes: false,
        }
    }

    fn addr(last: u8) -> Address {
        format!("0x{:040x}", last).parse().unwrap()
    }

    #[test]
    fn test_transfer_command_shape() {
        let node = node();
        let runner = Fixed(CommandOutput::success(""));
        let client = NodeClient::new(&runner, &node);
        let spec = client.transfer_command(&addr(1), &addr(2), TokenAmount::new(77));
        assert_eq!(
            spec.to_string(),
            format!(
                "cast send --rpc-url http://node:8545 --unlocked --from {} {} transfer(address,uint256) {} 77",
                addr(1),
                node.token,
                addr(2)
            )
        );
    }

    #[test]
    fn test_impersonate_command_uses_configured_method() {
        let node = node();
        let runner = Fixed(CommandOutput::success(""));
        let client = NodeClient::new(&runner, &node);
        let spec = client.impersonate_command(&addr(1));
        assert_eq!(spec.args[3], "anvil_impersonateAccount");
        assert_eq!(spec.args[4], addr(1).as_str());
    }

    #[test]
    fn test_streamed_writes_leave_reads_captured() {
        let streamed = NodeConfig {
            stream_writes: true,
            ..node()
        };
        let runner = Fixed(CommandOutput::success(""));
        let client = NodeClient::new(&runner, &streamed);
        let amount = TokenAmount::new(1);
        assert_eq!(client.impersonate_command(&addr(1)).io, IoMode::Inherit);
        assert_eq!(client.approve_command(&addr(2), &addr(3), amount).io, IoMode::Inherit);
        assert_eq!(client.transfer_command(&addr(1), &addr(2), amount).io, IoMode::Inherit);
        assert_eq!(client.balance_command(&addr(2)).io, IoMode::Capture);
        assert_eq!(client.allowance_command(&addr(2), &addr(3)).io, IoMode::Capture);

        let captured = node();
        let client = NodeClient::new(&runner, &captured);
        assert_eq!(client.transfer_command(&addr(1), &addr(2), amount).io, IoMode::Capture);
    }

    #[tokio::test]
    async fn test_read_parses_annotated_output() {
        let node = node();
        let runner = Fixed(CommandOutput::success("10000000000000000000000 [1e22]\n"));
        let client = NodeClient::new(&runner, &node);
        let balance = client.balance_of(&addr(2)).await.unwrap();
        assert_eq!(balance, TokenAmount::new(10_000_000_000_000_000_000_000));
    }

    #[tokio::test]
    async fn test_read_fails_on_non_zero_exit() {
        let node = node();
        let runner = Fixed(CommandOutput::failure(1, "execution reverted\n"));
        let client = NodeClient::new(&runner, &node);
        let err = client.allowance(&addr(2), &addr(3)).await.unwrap_err();
        match err {
            FundingError::CommandFailed { status, stderr, .. } => {
                assert_eq!(status, 1);
                assert_eq!(stderr, "execution reverted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
