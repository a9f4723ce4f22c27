use alloy::sol;

sol! {
    #[sol(rpc)]
    contract GenericERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}
