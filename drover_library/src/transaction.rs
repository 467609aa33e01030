use guid_create::GUID;

/// Correlates every log line of one logical operation across components.
pub type TransactionId = String;

pub fn gen_tid() -> TransactionId {
    GUID::rand().to_string().to_lowercase().replace('-', "")
}

lazy_static::lazy_static! {
  pub static ref STARTUP_TID: TransactionId = "Startup".to_string();
  pub static ref TEST_TID: TransactionId = "TestTest".to_string();
  pub static ref CTR_MGR_WORKER_TID: TransactionId = "CtrMgrHeartbeat".to_string();
}
