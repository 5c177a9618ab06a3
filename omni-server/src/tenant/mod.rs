//! Multi-tenant plumbing: partition handles, the directory that maps
//! tenants to partitions, and per-request tenant resolution.

pub mod directory;
pub mod partition;
pub mod resolver;

pub use directory::PartitionDirectory;
pub use partition::{Partition, PartitionError};
pub use resolver::{
    AdminHostStrategy, HostLookupStrategy, ResolveRequest, ResolveStrategy, SandboxTokenStrategy,
    TenantContext, TenantResolver, normalize_host, request_host, resolve_tenant,
};
