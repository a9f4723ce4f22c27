use alloy::sol;

sol! {
    #[sol(rpc)]
    contract EnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    #[sol(rpc)]
    contract EnsResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// ENSIP-10 wildcard resolution.
    #[sol(rpc)]
    contract ExtendedResolver {
        function supportsInterface(bytes4 interfaceID) external view returns (bool);
        function resolve(bytes name, bytes data) external view returns (bytes);
    }

    /// EIP-3668 revert asking the caller to fetch the answer offchain.
    error OffchainLookup(address sender, string[] urls, bytes callData, bytes4 callbackFunction, bytes extraData);

    #[sol(rpc)]
    contract ProxyReader {
        function get(string key, uint256 tokenId) external view returns (string value);
    }

    #[sol(rpc)]
    contract DomainHolderRegistry {
        function getDomainHolder(string domainName) external view returns (address);
    }
}
