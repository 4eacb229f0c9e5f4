//! Recording test doubles for the external collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, Log, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use crate::codec::{to_wire_format, RawHandle};
use crate::contract::{
    ContractTransport, EncryptedOrderHandles, EncryptedPortfolioHandles, OrderBook, OrderHeader,
    TransactionReceipt,
};
use crate::error::{BackendError, ContractError};
use crate::service::{
    ClearValues, EncryptedInput, EncryptedInputOutput, EncryptionService, HandleContractPair,
    ServiceBootstrap, ServiceHandle, UserDecryptRequest,
};
use crate::state::{decryption_domain, DecryptionPermit, KeyPair, NetworkConfig};
use crate::wallet::WalletSigner;

// ============================================================================
// ENCRYPTION SERVICE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedUserDecrypt {
    pub pairs: Vec<HandleContractPair>,
    pub key_pair: KeyPair,
    pub signature: Bytes,
    pub user_address: Address,
    pub contract_addresses: Vec<Address>,
}

#[derive(Default)]
struct ServiceLog {
    added: Vec<u32>,
    scopes: Vec<(Address, Address)>,
    encrypt_calls: usize,
    public_calls: usize,
    user_requests: Vec<RecordedUserDecrypt>,
    key_pairs: Vec<KeyPair>,
    clear: ClearValues,
}

/// In-memory FHE service
///
/// Every encrypted value gets a distinct handle whose plaintext is
/// remembered, so handles produced by `encrypt` decrypt back to their input.
#[derive(Default)]
pub struct MockService {
    log: Arc<Mutex<ServiceLog>>,
    fail_encrypt: bool,
    unset_handles: bool,
    fail_public: bool,
    fail_user: bool,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_encrypt(mut self) -> Self {
        self.fail_encrypt = true;
        self
    }

    /// Inputs answer with empty hex handles, which pad to the zero word
    pub fn unset_handles(mut self) -> Self {
        self.unset_handles = true;
        self
    }

    pub fn failing_public_decrypt(mut self) -> Self {
        self.fail_public = true;
        self
    }

    pub fn failing_user_decrypt(mut self) -> Self {
        self.fail_user = true;
        self
    }

    pub fn with_clear_value(self, handle: B256, value: u64) -> Self {
        self.log
            .lock()
            .unwrap()
            .clear
            .insert(handle, U256::from(value));
        self
    }

    pub fn added(&self) -> Vec<u32> {
        self.log.lock().unwrap().added.clone()
    }

    pub fn scopes(&self) -> Vec<(Address, Address)> {
        self.log.lock().unwrap().scopes.clone()
    }

    pub fn encrypt_calls(&self) -> usize {
        self.log.lock().unwrap().encrypt_calls
    }

    pub fn public_decrypt_calls(&self) -> usize {
        self.log.lock().unwrap().public_calls
    }

    pub fn user_decrypt_calls(&self) -> usize {
        self.log.lock().unwrap().user_requests.len()
    }

    pub fn user_requests(&self) -> Vec<RecordedUserDecrypt> {
        self.log.lock().unwrap().user_requests.clone()
    }

    pub fn key_pairs(&self) -> Vec<KeyPair> {
        self.log.lock().unwrap().key_pairs.clone()
    }

    fn lookup(&self, pairs: &[HandleContractPair]) -> ClearValues {
        let log = self.log.lock().unwrap();
        pairs
            .iter()
            .filter_map(|p| log.clear.get(&p.handle).map(|v| (p.handle, *v)))
            .collect()
    }
}

#[async_trait]
impl EncryptionService for MockService {
    fn create_encrypted_input(
        &self,
        contract_address: Address,
        account_address: Address,
    ) -> Box<dyn EncryptedInput> {
        self.log
            .lock()
            .unwrap()
            .scopes
            .push((contract_address, account_address));
        Box::new(MockInput {
            log: self.log.clone(),
            values: Vec::new(),
            fail: self.fail_encrypt,
            unset: self.unset_handles,
        })
    }

    fn generate_keypair(&self) -> KeyPair {
        let mut log = self.log.lock().unwrap();
        let n = log.key_pairs.len() as u8;
        let pair = KeyPair {
            public_key: Bytes::from(vec![0x70, n]),
            private_key: Bytes::from(vec![0x5e, n]),
        };
        log.key_pairs.push(pair.clone());
        pair
    }

    fn create_eip712(
        &self,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> DecryptionPermit {
        DecryptionPermit::new(
            decryption_domain(&NetworkConfig::sepolia()),
            public_key,
            contract_addresses,
            NetworkConfig::sepolia().chain_id,
            start_timestamp,
            duration_days,
        )
    }

    async fn public_decrypt(
        &self,
        pairs: &[HandleContractPair],
    ) -> Result<ClearValues, BackendError> {
        self.log.lock().unwrap().public_calls += 1;
        if self.fail_public {
            return Err(BackendError::new("handles are not publicly decryptable"));
        }
        Ok(self.lookup(pairs))
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest<'_>,
    ) -> Result<ClearValues, BackendError> {
        self.log.lock().unwrap().user_requests.push(RecordedUserDecrypt {
            pairs: request.pairs.to_vec(),
            key_pair: request.key_pair.clone(),
            signature: request.signature.clone(),
            user_address: request.user_address,
            contract_addresses: request.contract_addresses.to_vec(),
        });
        if self.fail_user {
            return Err(BackendError::new("relayer rejected the user decryption"));
        }
        Ok(self.lookup(request.pairs))
    }
}

struct MockInput {
    log: Arc<Mutex<ServiceLog>>,
    values: Vec<u32>,
    fail: bool,
    unset: bool,
}

#[async_trait]
impl EncryptedInput for MockInput {
    fn add32(&mut self, value: u32) -> &mut dyn EncryptedInput {
        self.values.push(value);
        self.log.lock().unwrap().added.push(value);
        self
    }

    async fn encrypt(&mut self) -> Result<EncryptedInputOutput, BackendError> {
        let mut log = self.log.lock().unwrap();
        log.encrypt_calls += 1;
        if self.fail {
            return Err(BackendError::new("ciphertext generation failed"));
        }

        let batch = log.encrypt_calls as u8;
        if self.unset {
            return Ok(EncryptedInputOutput {
                handles: self.values.iter().map(|_| RawHandle::from("0x")).collect(),
                input_proof: vec![batch],
            });
        }
        let mut handles = Vec::with_capacity(self.values.len());
        for (index, value) in self.values.iter().enumerate() {
            let mut raw = vec![0xf0, batch, index as u8];
            raw.extend_from_slice(&value.to_be_bytes());
            raw.resize(32, 0x11);
            let wire = to_wire_format(raw.as_slice()).unwrap();
            log.clear.insert(wire, U256::from(*value));
            handles.push(RawHandle::Bytes(raw));
        }
        Ok(EncryptedInputOutput {
            handles,
            input_proof: vec![0x0a, 0x0b, batch],
        })
    }
}

// ============================================================================
// BOOTSTRAP
// ============================================================================

pub struct MockBootstrap {
    service: Arc<MockService>,
    delay: Duration,
    available: bool,
    init_fails: bool,
    creates_to_fail: AtomicUsize,
    create_calls: AtomicUsize,
    init_calls: AtomicUsize,
}

impl MockBootstrap {
    pub fn new(service: MockService) -> Self {
        Self::sharing(Arc::new(service))
    }

    pub fn sharing(service: Arc<MockService>) -> Self {
        Self {
            service,
            delay: Duration::ZERO,
            available: true,
            init_fails: false,
            creates_to_fail: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub fn failing_creates(self, count: usize) -> Self {
        self.creates_to_fail.store(count, Ordering::SeqCst);
        self
    }

    pub fn never_available(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.init_fails = true;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceBootstrap for MockBootstrap {
    async fn wait_until_available(&self) {
        if !self.available {
            futures::future::pending::<()>().await;
        }
        tokio::time::sleep(self.delay).await;
    }

    async fn init_sdk(&self) -> Result<(), BackendError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.init_fails {
            return Err(BackendError::new("wasm module missing"));
        }
        Ok(())
    }

    async fn create_instance(&self, _network: &NetworkConfig) -> Result<ServiceHandle, BackendError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.creates_to_fail.load(Ordering::SeqCst);
        if remaining > 0 {
            self.creates_to_fail.store(remaining - 1, Ordering::SeqCst);
            return Err(BackendError::new("instance creation refused"));
        }
        Ok(self.service.clone() as ServiceHandle)
    }
}

// ============================================================================
// WALLET
// ============================================================================

pub struct MockSigner {
    address: Address,
    reject: bool,
    signed: AtomicUsize,
    signatures: Mutex<Vec<Bytes>>,
}

impl MockSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reject: false,
            signed: AtomicUsize::new(0),
            signatures: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    pub fn signed(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }

    /// Signatures handed out, oldest first
    pub fn signatures(&self) -> Vec<Bytes> {
        self.signatures.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(&self, permit: &DecryptionPermit) -> Result<Bytes, BackendError> {
        if self.reject {
            return Err(BackendError::new("user rejected the request"));
        }
        self.signed.fetch_add(1, Ordering::SeqCst);
        let hash = permit.signing_hash();
        let mut signature = hash.to_vec();
        signature.extend_from_slice(hash.as_slice());
        signature.push(27);
        let signature = Bytes::from(signature);
        self.signatures.lock().unwrap().push(signature.clone());
        Ok(signature)
    }
}

// ============================================================================
// CONTRACT
// ============================================================================

#[derive(Default)]
pub struct MockOrderBook {
    address: Address,
    headers: HashMap<u64, OrderHeader>,
    orders: HashMap<u64, EncryptedOrderHandles>,
    portfolios: HashMap<Address, EncryptedPortfolioHandles>,
    header_reads: AtomicUsize,
}

impl MockOrderBook {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order_id: u64, creator: Address, handles: [B256; 5]) -> Self {
        self.headers.insert(
            order_id,
            OrderHeader {
                creator,
                symbol: "GOLD".into(),
                timestamp: 1_700_000_000,
            },
        );
        self.orders.insert(order_id, handles.into());
        self
    }

    pub fn with_portfolio(mut self, trader: Address, handles: [B256; 3]) -> Self {
        self.portfolios.insert(trader, handles.into());
        self
    }

    pub fn header_reads(&self) -> usize {
        self.header_reads.load(Ordering::SeqCst)
    }
}

fn missing(method: &'static str) -> ContractError {
    ContractError::MalformedResponse {
        method,
        reason: "no such record".into(),
    }
}

#[async_trait]
impl OrderBook for MockOrderBook {
    fn address(&self) -> Address {
        self.address
    }

    async fn order_header(&self, order_id: u64) -> Result<OrderHeader, ContractError> {
        self.header_reads.fetch_add(1, Ordering::SeqCst);
        self.headers
            .get(&order_id)
            .cloned()
            .ok_or_else(|| missing("getOrderHeader(uint256)"))
    }

    async fn order_encrypted_data(
        &self,
        order_id: u64,
    ) -> Result<EncryptedOrderHandles, ContractError> {
        self.orders
            .get(&order_id)
            .copied()
            .ok_or_else(|| missing("getOrderEncryptedData(uint256)"))
    }

    async fn portfolio_encrypted_data(
        &self,
        trader: Address,
    ) -> Result<EncryptedPortfolioHandles, ContractError> {
        Ok(self
            .portfolios
            .get(&trader)
            .copied()
            .unwrap_or(EncryptedPortfolioHandles::from([B256::ZERO; 3])))
    }
}

/// Canned-response transport
///
/// Responses are matched on the longest registered calldata prefix, so a
/// selector-wide answer can be overridden for one argument.
#[derive(Default)]
pub struct MockTransport {
    responses: Vec<(Vec<u8>, Vec<u8>)>,
    logs: Vec<Log>,
    fail_sends: bool,
    calls: Mutex<Vec<(Address, Bytes)>>,
    sent: Mutex<Vec<(Address, Bytes)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning<C: SolCall>(mut self, output: Vec<u8>) -> Self {
        self.responses.push((C::SELECTOR.to_vec(), output));
        self
    }

    pub fn returning_for<C: SolCall>(mut self, call: &C, output: Vec<u8>) -> Self {
        self.responses.push((call.abi_encode(), output));
        self
    }

    pub fn with_logs(mut self, logs: Vec<Log>) -> Self {
        self.logs = logs;
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(Address, Bytes)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractTransport for MockTransport {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, BackendError> {
        self.calls.lock().unwrap().push((to, input.clone()));
        self.responses
            .iter()
            .filter(|(prefix, _)| input.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| Bytes::from(output.clone()))
            .ok_or_else(|| BackendError::new("execution reverted"))
    }

    async fn send_transaction(
        &self,
        to: Address,
        input: Bytes,
    ) -> Result<TransactionReceipt, BackendError> {
        if self.fail_sends {
            return Err(BackendError::new("insufficient funds for gas"));
        }
        self.sent.lock().unwrap().push((to, input));
        Ok(TransactionReceipt {
            transaction_hash: B256::repeat_byte(0xee),
            logs: self.logs.clone(),
        })
    }
}
