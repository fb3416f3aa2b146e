use crate::application::node::{
    ALLOWANCE_SIGNATURE, APPROVE_SIGNATURE, BALANCE_OF_SIGNATURE, TRANSFER_SIGNATURE,
};
use crate::config::DEFAULT_IMPERSONATE_METHOD;
use crate::domain::address::Address;
use crate::domain::amount::TokenAmount;
use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec, LivenessProbe};
use crate::error::{FundingError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
enum FaultKind {
    /// Exit non-zero for the next `remaining` matching commands.
    Fail { remaining: u32 },
    /// Exit zero without applying the write.
    Drop,
}

#[derive(Debug, Clone)]
struct Fault {
    pattern: String,
    kind: FaultKind,
}

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    unlocked: HashSet<Address>,
    impersonated: HashSet<Address>,
    faults: Vec<Fault>,
    calls: Vec<CommandSpec>,
    block_height: u64,
}

impl Ledger {
    fn can_sign(&self, account: &Address) -> bool {
        self.unlocked.contains(account) || self.impersonated.contains(account)
    }

    fn balance(&self, account: &Address) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or_default()
    }
}

/// Arguments of `send --unlocked --from <from> <token> <signature> <to> <amount>`.
struct SendArgs {
    from: Address,
    token: Address,
    signature: String,
    to: Address,
    amount: TokenAmount,
}

impl SendArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut from = None;
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--unlocked" => {}
                "--from" => from = iter.next(),
                _ => positional.push(arg.as_str()),
            }
        }

        let malformed = || FundingError::Parse {
            what: "send arguments",
            raw: args.join(" "),
        };
        match (from, positional.as_slice()) {
            (Some(from), [token, signature, to, amount]) => Ok(Self {
                from: from.parse()?,
                token: token.parse()?,
                signature: signature.to_string(),
                to: to.parse()?,
                amount: amount.parse()?,
            }),
            _ => Err(malformed()),
        }
    }
}

/// An in-process token ledger that understands the node client's commands.
///
/// Implements both `CommandRunner` and `LivenessProbe`, so an engine can run
/// end-to-end against it. Clones share the same ledger.
#[derive(Clone)]
pub struct InMemoryNode {
    token: Address,
    impersonate_method: String,
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryNode {
    /// Creates a node hosting a single token contract, already at block 1.
    pub fn new(token: Address) -> Self {
        let ledger = Ledger {
            block_height: 1,
            ..Ledger::default()
        };
        Self {
            token,
            impersonate_method: DEFAULT_IMPERSONATE_METHOD.to_string(),
            ledger: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn with_impersonate_method(mut self, method: impl Into<String>) -> Self {
        self.impersonate_method = method.into();
        self
    }

    /// Lets `account` sign sends without impersonation.
    pub async fn unlock(&self, account: &Address) {
        self.ledger.write().await.unlocked.insert(account.clone());
    }

    pub async fn set_balance(&self, account: &Address, amount: TokenAmount) {
        self.ledger
            .write()
            .await
            .balances
            .insert(account.clone(), amount);
    }

    pub async fn balance(&self, account: &Address) -> TokenAmount {
        self.ledger.read().await.balance(account)
    }

    pub async fn set_allowance(&self, owner: &Address, spender: &Address, amount: TokenAmount) {
        self.ledger
            .write()
            .await
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub async fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.ledger
            .read()
            .await
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub async fn set_block_height(&self, height: u64) {
        self.ledger.write().await.block_height = height;
    }

    /// Makes the next `times` commands containing `pattern` exit with status 1.
    pub async fn fail_next(&self, pattern: &str, times: u32) {
        self.ledger.write().await.faults.push(Fault {
            pattern: pattern.to_string(),
            kind: FaultKind::Fail { remaining: times },
        });
    }

    /// Makes every write containing `pattern` report success without effect.
    pub async fn drop_writes(&self, pattern: &str) {
        self.ledger.write().await.faults.push(Fault {
            pattern: pattern.to_string(),
            kind: FaultKind::Drop,
        });
    }

    /// Every command received so far, in order.
    pub async fn calls(&self) -> Vec<CommandSpec> {
        self.ledger.read().await.calls.clone()
    }

    pub async fn count_calls(&self, pattern: &str) -> usize {
        self.ledger
            .read()
            .await
            .calls
            .iter()
            .filter(|spec| spec.to_string().contains(pattern))
            .count()
    }

    fn rpc(&self, ledger: &mut Ledger, args: &[String]) -> CommandOutput {
        match args {
            [method, account] if *method == self.impersonate_method => match account.parse() {
                Ok(address) => {
                    ledger.impersonated.insert(address);
                    CommandOutput::success("null\n")
                }
                Err(e) => CommandOutput::failure(1, e.to_string()),
            },
            [method, ..] => CommandOutput::failure(1, format!("method not found: {}", method)),
            [] => CommandOutput::failure(2, "missing rpc method"),
        }
    }

    fn send(&self, ledger: &mut Ledger, args: &[String]) -> CommandOutput {
        let SendArgs {
            from,
            token,
            signature,
            to,
            amount,
        } = match SendArgs::parse(args) {
            Ok(parsed) => parsed,
            Err(e) => return CommandOutput::failure(2, e.to_string()),
        };

        if token != self.token {
            return CommandOutput::failure(1, format!("no contract at {}", token));
        }
        if !ledger.can_sign(&from) {
            return CommandOutput::failure(1, format!("No Signer available for {}", from));
        }

        match signature.as_str() {
            APPROVE_SIGNATURE => {
                ledger.allowances.insert((from, to), amount);
            }
            TRANSFER_SIGNATURE => {
                let available = ledger.balance(&from);
                let Some(remaining) = available.checked_sub(amount) else {
                    return CommandOutput::failure(
                        1,
                        "execution reverted: ERC20: transfer amount exceeds balance",
                    );
                };
                ledger.balances.insert(from, remaining);
                let credited = ledger
                    .balance(&to)
                    .checked_add(amount)
                    .unwrap_or(TokenAmount::MAX);
                ledger.balances.insert(to, credited);
            }
            other => return CommandOutput::failure(1, format!("unsupported function {}", other)),
        }
        ledger.block_height += 1;
        CommandOutput::success("status 1 (success)\n")
    }

    fn call(&self, ledger: &Ledger, args: &[String]) -> CommandOutput {
        let parse = |raw: &String| raw.parse::<Address>();
        let value = match args {
            [token, signature, owner] if signature == BALANCE_OF_SIGNATURE => {
                match (parse(token), parse(owner)) {
                    (Ok(token), Ok(owner)) if token == self.token => ledger.balance(&owner),
                    _ => return CommandOutput::failure(1, "invalid balanceOf call"),
                }
            }
            [token, signature, owner, spender] if signature == ALLOWANCE_SIGNATURE => {
                match (parse(token), parse(owner), parse(spender)) {
                    (Ok(token), Ok(owner), Ok(spender)) if token == self.token => ledger
                        .allowances
                        .get(&(owner, spender))
                        .copied()
                        .unwrap_or_default(),
                    _ => return CommandOutput::failure(1, "invalid allowance call"),
                }
            }
            _ => return CommandOutput::failure(1, "unsupported call"),
        };
        CommandOutput::success(format!("{}\n", value))
    }
}

#[async_trait]
impl CommandRunner for InMemoryNode {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut ledger = self.ledger.write().await;
        ledger.calls.push(spec.clone());

        // args: <subcommand> --rpc-url <url> <rest...>
        let (subcommand, rest) = match spec.args.as_slice() {
            [sub, flag, _url, rest @ ..] if flag == "--rpc-url" => (sub.as_str(), rest),
            _ => return Ok(CommandOutput::failure(2, "missing --rpc-url")),
        };
        let is_write = subcommand != "call";
        let rendered = spec.to_string();

        for fault in ledger.faults.iter_mut() {
            if !rendered.contains(&fault.pattern) {
                continue;
            }
            match &mut fault.kind {
                FaultKind::Fail { remaining } if *remaining > 0 => {
                    *remaining -= 1;
                    return Ok(CommandOutput::failure(1, "injected failure"));
                }
                FaultKind::Drop if is_write => {
                    return Ok(CommandOutput::success("status 1 (success)\n"));
                }
                _ => {}
            }
        }

        Ok(match subcommand {
            "rpc" => self.rpc(&mut ledger, rest),
            "send" => self.send(&mut ledger, rest),
            "call" => self.call(&ledger, rest),
            other => CommandOutput::failure(2, format!("unrecognized subcommand '{}'", other)),
        })
    }
}

#[async_trait]
impl LivenessProbe for InMemoryNode {
    async fn block_height(&self) -> Result<u64> {
        Ok(self.ledger.read().await.block_height)
    }

    fn endpoint(&self) -> &str {
        "in-memory"
    }
}
