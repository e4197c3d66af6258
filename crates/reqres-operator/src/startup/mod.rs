mod crds;

pub use crds::{ensure_crds_installed, USER_CRD_NAME};
