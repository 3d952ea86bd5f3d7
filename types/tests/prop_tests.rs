use proptest::prelude::*;

use solar_types::{to_raw, Address, U256};

proptest! {
    /// Address roundtrip: display -> parse produces the identical address.
    #[test]
    fn address_display_parse_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        prop_assert_eq!(addr.is_zero(), bytes == [0u8; 20]);
    }

    /// Address bincode serialization roundtrip.
    #[test]
    fn address_bincode_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let encoded = bincode::serialize(&addr).unwrap();
        let decoded: Address = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, addr);
    }

    /// Raw conversion is exact multiplication by 10^decimals.
    #[test]
    fn to_raw_matches_u128_math(tokens in 0u64..u64::MAX, decimals in 0u8..18) {
        let expected = tokens as u128 * 10u128.pow(decimals as u32);
        prop_assert_eq!(to_raw(tokens, decimals), Some(U256::from(expected)));
    }
}
