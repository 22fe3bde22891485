use alloy::primitives::{Address, address};
use alloy::sol;

/// Address of the EventTicket contract deployed on Sepolia.
pub const EVENT_TICKET_ADDRESS: Address = address!("7cf4da7307ac0213542b6838969058469c412555");

sol! {
    /// ERC-721 ticketing contract with per-ticket transfer ceilings.
    interface IEventTicket {
        event EventCreated(uint256 eventId, string name, uint256 maxTickets, uint256 price);
        event TicketMinted(uint256 indexed tokenId, uint256 indexed eventId, address indexed buyer);
        event TicketTransferred(
            uint256 indexed tokenId,
            address indexed from,
            address indexed to,
            uint256 transferCount,
            uint256 maxTransfers
        );

        function createEvent(
            string _name,
            uint256 _maxTickets,
            uint256 _price,
            uint256 _eventDate,
            uint256 _maxTransfers
        ) external returns (uint256);
        function mintTicket(uint256 _eventId, string _tokenURI) external payable returns (uint256);
        function transferFrom(address from, address to, uint256 tokenId) external;
        function validateTicket(uint256 _tokenId) external;

        function events(uint256) external view returns (
            string name,
            uint256 maxTickets,
            uint256 ticketsSold,
            uint256 pricePerTicket,
            uint256 eventDate,
            bool active,
            uint256 maxTransfersPerTicket,
            address organizer
        );
        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string);
        function ticketTransferCount(uint256) external view returns (uint256);
        function ticketEventId(uint256) external view returns (uint256);
        function hasAttended(uint256, address) external view returns (bool);
    }
}

/// Where the contract lives and how to link to it.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    pub address: Address,
    pub explorer_url: Option<String>,
}

impl ContractDescriptor {
    pub fn new(address: Address, explorer_url: Option<String>) -> Self {
        Self {
            address,
            explorer_url,
        }
    }

    /// Block explorer page for the contract, if the chain has an explorer.
    pub fn explorer_link(&self) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/address/{:#x}", base.trim_end_matches('/'), self.address))
    }

    /// Explorer page for a transaction hash.
    pub fn tx_link(&self, hash: &alloy::primitives::B256) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{hash}", base.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn test_erc721_selectors() {
        assert_eq!(IEventTicket::transferFromCall::SELECTOR, [0x23, 0xb8, 0x72, 0xdd]);
        assert_eq!(IEventTicket::ownerOfCall::SELECTOR, [0x63, 0x52, 0x21, 0x1e]);
        assert_eq!(IEventTicket::tokenURICall::SELECTOR, [0xc8, 0x7b, 0x56, 0xdd]);
    }

    #[test]
    fn test_event_signatures() {
        assert_eq!(
            IEventTicket::EventCreated::SIGNATURE,
            "EventCreated(uint256,string,uint256,uint256)"
        );
        assert_eq!(
            IEventTicket::TicketMinted::SIGNATURE,
            "TicketMinted(uint256,uint256,address)"
        );
        assert_eq!(
            IEventTicket::TicketTransferred::SIGNATURE,
            "TicketTransferred(uint256,address,address,uint256,uint256)"
        );
    }

    #[test]
    fn test_function_signatures() {
        assert_eq!(
            IEventTicket::createEventCall::SIGNATURE,
            "createEvent(string,uint256,uint256,uint256,uint256)"
        );
        assert_eq!(IEventTicket::mintTicketCall::SIGNATURE, "mintTicket(uint256,string)");
        assert_eq!(IEventTicket::eventsCall::SIGNATURE, "events(uint256)");
        assert_eq!(
            IEventTicket::hasAttendedCall::SIGNATURE,
            "hasAttended(uint256,address)"
        );
    }

    #[test]
    fn test_explorer_link() {
        let descriptor = ContractDescriptor::new(
            EVENT_TICKET_ADDRESS,
            Some("https://sepolia.etherscan.io/".to_string()),
        );
        assert_eq!(
            descriptor.explorer_link().as_deref(),
            Some("https://sepolia.etherscan.io/address/0x7cf4da7307ac0213542b6838969058469c412555")
        );
    }

    #[test]
    fn test_no_explorer() {
        let descriptor = ContractDescriptor::new(EVENT_TICKET_ADDRESS, None);
        assert!(descriptor.explorer_link().is_none());
        assert!(descriptor.tx_link(&alloy::primitives::B256::ZERO).is_none());
    }

    #[test]
    fn test_tx_link() {
        let descriptor = ContractDescriptor::new(
            EVENT_TICKET_ADDRESS,
            Some("https://sepolia.etherscan.io".to_string()),
        );
        let hash = alloy::primitives::B256::repeat_byte(0xab);
        assert_eq!(
            descriptor.tx_link(&hash),
            Some(format!("https://sepolia.etherscan.io/tx/0x{}", "ab".repeat(32)))
        );
    }
}
