//! CLI tool for deploying and operating the vault engine contracts.

use tokenizer_contracts::oracle::OracleHandler;
use tokenizer_contracts::positions::{LendingConnector, PositionManager};
use tokenizer_contracts::share::TokenizedShare;
use tokenizer_contracts::token::AssetToken;
use tokenizer_contracts::tokenizer::VaultEngine;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::HostEnv;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

const BASE_CURRENCY: &str = "USDC";
const BASE_DECIMALS: u8 = 6;

/// Deploys the base currency token and the price oracle.
pub struct PricingDeployScript;

impl DeployScript for PricingDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use tokenizer_contracts::oracle::OracleHandlerInitArgs;
        use tokenizer_contracts::token::AssetTokenInitArgs;

        let _base = AssetToken::load_or_deploy(
            &env,
            AssetTokenInitArgs {
                name: String::from("USD Coin"),
                symbol: String::from(BASE_CURRENCY),
                decimals: BASE_DECIMALS,
            },
            container,
            300_000_000_000
        )?;

        let _oracle = OracleHandler::load_or_deploy(
            &env,
            OracleHandlerInitArgs {
                base_currency: String::from(BASE_CURRENCY),
                base_decimals: BASE_DECIMALS,
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the lending connector and the position manager around it.
/// Requires the oracle to be deployed first.
pub struct PositionsDeployScript;

impl DeployScript for PositionsDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use tokenizer_contracts::positions::lending_connector::LendingConnectorInitArgs;
        use tokenizer_contracts::positions::position_manager::PositionManagerInitArgs;

        let oracle = container.contract_ref::<OracleHandler>(env)?;

        let lending = LendingConnector::load_or_deploy(
            &env,
            LendingConnectorInitArgs {
                oracle_handler: oracle.address().clone(),
            },
            container,
            400_000_000_000
        )?;

        let _manager = PositionManager::load_or_deploy(
            &env,
            PositionManagerInitArgs {
                names: vec![String::from("LENDING")],
                connectors: vec![lending.address().clone()],
            },
            container,
            400_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the vault engine and its share ledger.
/// Requires the base currency token to be deployed first.
pub struct EngineDeployScript;

impl DeployScript for EngineDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use tokenizer_contracts::share::TokenizedShareInitArgs;
        use tokenizer_contracts::tokenizer::engine::VaultEngineInitArgs;

        let base = container.contract_ref::<AssetToken>(env)?;

        let engine = VaultEngine::load_or_deploy(
            &env,
            VaultEngineInitArgs {
                base_currency: String::from(BASE_CURRENCY),
                base_token: base.address().clone(),
            },
            container,
            500_000_000_000
        )?;

        let _share = TokenizedShare::load_or_deploy(
            &env,
            TokenizedShareInitArgs {
                name: String::from("Vault Share"),
                symbol: String::from("vSHARE"),
                minter: engine.address().clone(),
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the complete stack.
pub struct StackDeployScript;

impl DeployScript for StackDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        PricingDeployScript.deploy(env, container)?;
        PositionsDeployScript.deploy(env, container)?;
        EngineDeployScript.deploy(env, container)?;
        Ok(())
    }
}

/// Scenario to initialize the engine and bind its components.
pub struct InitializeScenario;

impl Scenario for InitializeScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![CommandArg::new(
            "custody",
            "Address of the custody holding pool funds",
            NamedCLType::Key,
        )]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut engine = container.contract_ref::<VaultEngine>(env)?;
        let share = container.contract_ref::<TokenizedShare>(env)?;
        let oracle = container.contract_ref::<OracleHandler>(env)?;
        let manager = container.contract_ref::<PositionManager>(env)?;
        let custody = args.get_single::<Address>("custody")?;

        env.set_gas(100_000_000_000);
        engine.try_initialize(custody)?;
        env.set_gas(50_000_000_000);
        engine.try_set_tokenized_share(share.address().clone())?;
        env.set_gas(50_000_000_000);
        engine.try_set_oracle_handler(oracle.address().clone())?;
        env.set_gas(50_000_000_000);
        engine.try_set_position_manager(manager.address().clone())?;

        println!("Engine initialized with custody {:?}", custody);
        Ok(())
    }
}

impl ScenarioMetadata for InitializeScenario {
    const NAME: &'static str = "initialize";
    const DESCRIPTION: &'static str = "Binds the custody and wires share ledger, oracle and position manager";
}

/// Scenario to whitelist a deposit currency.
pub struct AddCurrencyScenario;

impl Scenario for AddCurrencyScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new("symbol", "Currency symbol known to the oracle", NamedCLType::String),
            CommandArg::new("token", "Address of the CEP-18 token", NamedCLType::Key),
            CommandArg::new(
                "is_direct",
                "Whether the currency is worth one base unit per unit",
                NamedCLType::Bool,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut engine = container.contract_ref::<VaultEngine>(env)?;
        let symbol = args.get_single::<String>("symbol")?;
        let token = args.get_single::<Address>("token")?;
        let is_direct = args.get_single::<bool>("is_direct")?;

        env.set_gas(50_000_000_000);
        engine.try_add_supported_currency(symbol.clone(), token, is_direct)?;

        println!("Currency {} is now supported", symbol);
        Ok(())
    }
}

impl ScenarioMetadata for AddCurrencyScenario {
    const NAME: &'static str = "add-currency";
    const DESCRIPTION: &'static str = "Adds a supported deposit currency";
}

/// Scenario to deposit into the vault.
/// The caller must have approved the engine for `amount` beforehand.
pub struct DepositScenario;

impl Scenario for DepositScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new("currency", "Symbol of the deposited currency", NamedCLType::String),
            CommandArg::new("amount", "Amount in the currency's smallest unit", NamedCLType::U256),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut engine = container.contract_ref::<VaultEngine>(env)?;
        let currency = args.get_single::<String>("currency")?;
        let amount = args.get_single::<U256>("amount")?;

        env.set_gas(300_000_000_000);
        let shares = engine.try_deposit(currency, amount)?;

        println!("Minted {} shares", shares);
        Ok(())
    }
}

impl ScenarioMetadata for DepositScenario {
    const NAME: &'static str = "deposit";
    const DESCRIPTION: &'static str = "Deposits a supported currency and mints shares";
}

/// Scenario to redeem shares for base currency.
pub struct RedeemScenario;

impl Scenario for RedeemScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![CommandArg::new("shares", "Share amount to burn", NamedCLType::U256)]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut engine = container.contract_ref::<VaultEngine>(env)?;
        let shares = args.get_single::<U256>("shares")?;

        env.set_gas(300_000_000_000);
        let paid = engine.try_redeem(shares)?;

        println!("Redeemed {} shares for {} {}", shares, paid, BASE_CURRENCY);
        Ok(())
    }
}

impl ScenarioMetadata for RedeemScenario {
    const NAME: &'static str = "redeem";
    const DESCRIPTION: &'static str = "Burns shares and pays out base currency";
}

/// Scenario to move custody funds into the engine's redemption float.
/// The custody must have approved the engine for `amount` beforehand.
pub struct PullFromCustodyScenario;

impl Scenario for PullFromCustodyScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new("currency", "Symbol of the currency to pull", NamedCLType::String),
            CommandArg::new("amount", "Amount in the currency's smallest unit", NamedCLType::U256),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut engine = container.contract_ref::<VaultEngine>(env)?;
        let currency = args.get_single::<String>("currency")?;
        let amount = args.get_single::<U256>("amount")?;

        env.set_gas(100_000_000_000);
        engine.try_pull_from_custody(currency.clone(), amount)?;

        println!("Pulled {} {} from custody", amount, currency);
        Ok(())
    }
}

impl ScenarioMetadata for PullFromCustodyScenario {
    const NAME: &'static str = "pull-from-custody";
    const DESCRIPTION: &'static str = "Moves approved custody funds into the engine";
}

/// Scenario to print the pool's NAV and price per share.
pub struct NavScenario;

impl Scenario for NavScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args
    ) -> Result<(), Error> {
        let engine = container.contract_ref::<VaultEngine>(env)?;

        let nav = engine.try_calculate_nav()?;
        let price = engine.try_get_price_per_share()?;
        let supply = engine.try_get_total_shares_outstanding()?;
        let float = engine.try_direct_liquidity()?;

        println!("Assets:           {}", nav.assets);
        println!("Liabilities:      {}", nav.liabilities);
        println!("Price per share:  {}", price);
        println!("Shares:           {}", supply);
        println!("Redemption float: {}", float);
        Ok(())
    }
}

impl ScenarioMetadata for NavScenario {
    const NAME: &'static str = "nav";
    const DESCRIPTION: &'static str = "Prints NAV, price per share and redemption float";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the vault engine contracts")
        // Deploy scripts
        .deploy(PricingDeployScript)
        .deploy(PositionsDeployScript)
        .deploy(EngineDeployScript)
        .deploy(StackDeployScript)
        // Contract references
        .contract::<AssetToken>()
        .contract::<OracleHandler>()
        .contract::<LendingConnector>()
        .contract::<PositionManager>()
        .contract::<VaultEngine>()
        .contract::<TokenizedShare>()
        // Scenarios
        .scenario(InitializeScenario)
        .scenario(AddCurrencyScenario)
        .scenario(DepositScenario)
        .scenario(RedeemScenario)
        .scenario(PullFromCustodyScenario)
        .scenario(NavScenario)
        .build()
        .run();
}
