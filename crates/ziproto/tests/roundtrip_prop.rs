use proptest::prelude::*;
use ziproto::{
    decode, encode, ArrMapMode, BigintMode, DecodingOptions, EncodingOptions, StrBinMode, Value,
};

// Force modes pin the ambiguous variants (Bin stays bin, Map stays map),
// and the unsigned bigint policy lets UInt survive the decode, so every
// generated tree must round-trip exactly.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        ((i64::MAX as u64 + 1)..=u64::MAX).prop_map(Value::UInt),
        (-1.0e9f64..1.0e9).prop_map(Value::Float64),
        ".*".prop_map(Value::Str),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bin),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::vec((inner.clone(), inner), 0..6).prop_map(Value::Map),
        ]
    })
}

proptest! {
    #[test]
    fn roundtrip_under_force_modes(value in value_strategy()) {
        let enc_opts = EncodingOptions {
            str_bin: StrBinMode::ForceBin,
            arr_map: ArrMapMode::ForceMap,
            ..Default::default()
        };
        let dec_opts = DecodingOptions {
            bigint: BigintMode::AsUnsigned,
            ..Default::default()
        };
        let bytes = encode(&value, &enc_opts).unwrap();
        let back = decode(&bytes, &dec_opts).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn integer_width_is_minimal(int in any::<i64>()) {
        let bytes = encode(&Value::Int(int), &EncodingOptions::from_defaults()).unwrap();
        let expected = if (0..=0x7f).contains(&int) || (-0x20..0).contains(&int) {
            1
        } else if (0..=0xff).contains(&int) || (-0x80..0).contains(&int) {
            2
        } else if (0..=0xffff).contains(&int) || (-0x8000..0).contains(&int) {
            3
        } else if (0..=0xffff_ffff).contains(&int) || (-0x8000_0000..0).contains(&int) {
            5
        } else {
            9
        };
        prop_assert_eq!(bytes.len(), expected);
    }
}
