use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{SolCall, SolEvent};
use color_eyre::eyre::{Result, bail};
use tracing::debug;

use crate::data::contract::IEventTicket;
use crate::data::reader::ChainReader;
use crate::data::types::{EventInfo, to_u64};

/// How the user is connected.
pub enum Wallet {
    Disconnected,
    /// Reads as this account, cannot sign.
    WatchOnly(Address),
    Signer(PrivateKeySigner),
}

/// HTTP provider bound to the ticketing contract, optionally carrying a
/// local signer for writes.
pub struct ChainClient {
    provider: Box<dyn Provider + Send + Sync>,
    chain_id: u64,
    contract: Address,
    account: Option<Address>,
    can_sign: bool,
}

impl ChainClient {
    /// Connect to a node via HTTP RPC and bind the contract address.
    pub async fn connect(rpc_url: &str, contract: Address, wallet: Wallet) -> Result<Self> {
        let url = rpc_url.parse()?;
        let (provider, account, can_sign): (Box<dyn Provider + Send + Sync>, _, _) = match wallet
        {
            Wallet::Signer(signer) => {
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .on_http(url);
                (Box::new(provider), Some(address), true)
            }
            Wallet::WatchOnly(address) => {
                (Box::new(ProviderBuilder::new().on_http(url)), Some(address), false)
            }
            Wallet::Disconnected => (Box::new(ProviderBuilder::new().on_http(url)), None, false),
        };
        let chain_id = provider.get_chain_id().await?;
        Ok(Self {
            provider,
            chain_id,
            contract,
            account,
            can_sign,
        })
    }

    /// Return the chain ID obtained at connection time.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// The connected account, if any.
    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn can_sign(&self) -> bool {
        self.can_sign
    }

    /// Get the latest block number.
    pub async fn get_latest_block_number(&self) -> Result<u64> {
        let number = self.provider.get_block_number().await?;
        Ok(number)
    }

    /// Get the ETH balance of an address at the latest block.
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        let balance = self.provider.get_balance(address).await?;
        Ok(balance)
    }

    /// Execute a view call against the contract and decode its return values.
    pub async fn call<C: SolCall + Send>(&self, call: C) -> Result<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(call.abi_encode());
        let output = self.provider.call(tx).await?;
        let decoded = C::abi_decode_returns(&output, true)?;
        Ok(decoded)
    }

    /// Sign and broadcast a contract call. The returned builder resolves to
    /// the receipt once the transaction is mined.
    pub async fn send<C: SolCall + Send>(
        &self,
        call: C,
        value: U256,
    ) -> Result<PendingTransactionBuilder<Ethereum>> {
        if !self.can_sign {
            bail!("A signing wallet is required to send transactions");
        }
        let tx = TransactionRequest::default()
            .with_to(self.contract)
            .with_input(call.abi_encode())
            .with_value(value);
        debug!(function = C::SIGNATURE, %value, "sending transaction");
        let pending = self.provider.send_transaction(tx).await?;
        Ok(pending)
    }

    fn contract_logs<E: SolEvent>(&self, from_block: u64) -> Filter {
        Filter::new()
            .address(self.contract)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(from_block)
    }
}

impl ChainReader for ChainClient {
    async fn event(&self, id: u64) -> Result<EventInfo> {
        let record = self
            .call(IEventTicket::eventsCall { _0: U256::from(id) })
            .await?;
        Ok(EventInfo::from_record(id, record))
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address> {
        let owner = self
            .call(IEventTicket::ownerOfCall {
                tokenId: U256::from(token_id),
            })
            .await?;
        Ok(owner._0)
    }

    async fn ticket_event_id(&self, token_id: u64) -> Result<u64> {
        let event_id = self
            .call(IEventTicket::ticketEventIdCall {
                _0: U256::from(token_id),
            })
            .await?;
        Ok(to_u64(event_id._0))
    }

    async fn ticket_transfer_count(&self, token_id: u64) -> Result<u64> {
        let count = self
            .call(IEventTicket::ticketTransferCountCall {
                _0: U256::from(token_id),
            })
            .await?;
        Ok(to_u64(count._0))
    }

    async fn token_uri(&self, token_id: u64) -> Result<String> {
        let uri = self
            .call(IEventTicket::tokenURICall {
                tokenId: U256::from(token_id),
            })
            .await?;
        Ok(uri._0)
    }

    async fn has_attended(&self, event_id: u64, account: Address) -> Result<bool> {
        let attended = self
            .call(IEventTicket::hasAttendedCall {
                _0: U256::from(event_id),
                _1: account,
            })
            .await?;
        Ok(attended._0)
    }

    async fn created_event_ids(&self, from_block: u64) -> Result<Vec<u64>> {
        let filter = self.contract_logs::<IEventTicket::EventCreated>(from_block);
        let logs = self.provider.get_logs(&filter).await?;
        let mut ids: Vec<u64> = logs
            .iter()
            .filter_map(|log| log.log_decode::<IEventTicket::EventCreated>().ok())
            .map(|decoded| to_u64(decoded.inner.data.eventId))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn received_token_ids(&self, account: Address, from_block: u64) -> Result<Vec<u64>> {
        // buyer and recipient are both the third indexed topic
        let minted = self
            .contract_logs::<IEventTicket::TicketMinted>(from_block)
            .topic3(account.into_word());
        let transferred = self
            .contract_logs::<IEventTicket::TicketTransferred>(from_block)
            .topic3(account.into_word());

        let (minted_logs, transferred_logs) = tokio::try_join!(
            self.provider.get_logs(&minted),
            self.provider.get_logs(&transferred),
        )?;

        let mut ids: Vec<u64> = minted_logs
            .iter()
            .filter_map(|log| log.log_decode::<IEventTicket::TicketMinted>().ok())
            .map(|decoded| to_u64(decoded.inner.data.tokenId))
            .chain(
                transferred_logs
                    .iter()
                    .filter_map(|log| log.log_decode::<IEventTicket::TicketTransferred>().ok())
                    .map(|decoded| to_u64(decoded.inner.data.tokenId)),
            )
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
