//! Address allocation errors

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use thiserror::Error;

/// Errors raised while carving subnets or reserving addresses.
#[derive(Debug, Error)]
pub enum IpamError {
    /// No free block of the requested size is left in the network
    #[error("No free /{prefix} block left in {network} ({cidr}) for subnet {subnet}")]
    NoFreeBlock {
        network: String,
        cidr: Ipv4Network,
        prefix: u8,
        subnet: String,
    },

    /// Requested block is larger than the network itself
    #[error("Cannot carve a /{prefix} from {network} ({cidr})")]
    PrefixTooShort {
        network: String,
        cidr: Ipv4Network,
        prefix: u8,
    },

    /// Explicit subnet CIDR is not inside the network
    #[error("Subnet {cidr} is not within network {network} ({network_cidr})")]
    OutOfRange {
        cidr: Ipv4Network,
        network: String,
        network_cidr: Ipv4Network,
    },

    /// Explicit subnet CIDR overlaps a subnet already carved
    #[error("Subnet {cidr} overlaps existing subnet {existing} ({existing_cidr})")]
    Overlap {
        cidr: Ipv4Network,
        existing: String,
        existing_cidr: Ipv4Network,
    },

    /// A subnet with this name already exists in the network
    #[error("Network {network} already has a subnet named {subnet}")]
    DuplicateSubnet { network: String, subnet: String },

    /// The supernet hack has been applied; no more subnets may be carved
    #[error("Network {0} is sealed by the supernet hack")]
    Sealed(String),

    /// Subnet lookup by name failed
    #[error("Subnet {subnet} not found in network {network}")]
    SubnetNotFound { network: String, subnet: String },

    /// Reservation lookup by name failed
    #[error("Reservation {name} not found in subnet {subnet}")]
    ReservationNotFound { subnet: String, name: String },

    /// Every usable address in the subnet is taken
    #[error("No free address left in subnet {subnet} ({cidr}) for {name}")]
    SubnetExhausted {
        subnet: String,
        cidr: Ipv4Network,
        name: String,
    },

    /// Address requested for a reservation is already taken
    #[error("Address {ip} in subnet {subnet} is already reserved by {owner}")]
    AddressInUse {
        subnet: String,
        ip: Ipv4Addr,
        owner: String,
    },

    /// Address requested for a reservation is outside the subnet
    #[error("Address {ip} is not within subnet {subnet} ({cidr})")]
    AddressOutOfRange {
        subnet: String,
        ip: Ipv4Addr,
        cidr: Ipv4Network,
    },

    /// Cabinet subnets need more VLANs than the network's range holds
    #[error("Network {network} VLAN range {start}-{end} has no VLAN left for {subnet}")]
    VlanRangeExhausted {
        network: String,
        start: u16,
        end: u16,
        subnet: String,
    },

    /// Reservations leave no room for a DHCP pool
    #[error("Subnet {subnet} has no room left for a DHCP range")]
    NoDhcpRange { subnet: String },

    /// CIDR arithmetic failed
    #[error("Invalid CIDR: {0}")]
    Cidr(#[from] ipnetwork::IpNetworkError),
}
