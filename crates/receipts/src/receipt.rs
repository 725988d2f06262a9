use alloy_rlp::{Decodable, Encodable, Header};
use ember_primitives::{Bloom, Bytes, Log, B256, U256};

/// Transaction receipt. The first field changed meaning at Byzantium
/// (EIP-658): a 32-byte intermediate state root before, a status integer
/// after. The wire shapes are distinguished by that field's length.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxReceipt {
    /// Pre-Byzantium receipt with an intermediate state root.
    PreByzantium {
        state_root: B256,
        cumulative_gas_used: U256,
        logs: Vec<Log>,
    },
    /// Post-Byzantium receipt with a success status.
    PostByzantium {
        status: bool,
        cumulative_gas_used: U256,
        logs: Vec<Log>,
    },
}

impl TxReceipt {
    /// Gas used by the block up to and including this transaction.
    pub fn cumulative_gas_used(&self) -> U256 {
        match self {
            Self::PreByzantium {
                cumulative_gas_used,
                ..
            }
            | Self::PostByzantium {
                cumulative_gas_used,
                ..
            } => *cumulative_gas_used,
        }
    }

    /// Logs emitted by the transaction.
    pub fn logs(&self) -> &[Log] {
        match self {
            Self::PreByzantium { logs, .. } | Self::PostByzantium { logs, .. } => logs,
        }
    }

    /// Whether the transaction succeeded. Pre-Byzantium receipts carry no
    /// status, which reads as success.
    pub fn is_success(&self) -> bool {
        match self {
            Self::PreByzantium { .. } => true,
            Self::PostByzantium { status, .. } => *status,
        }
    }

    /// 2048-bit bloom over the receipt's log addresses and topics.
    pub fn bloom(&self) -> Bloom {
        Bloom::from_logs(self.logs())
    }

    fn payload_length(&self) -> usize {
        match self {
            Self::PreByzantium {
                state_root,
                cumulative_gas_used,
                logs,
            } => state_root.length() + cumulative_gas_used.length() + logs.length(),
            Self::PostByzantium {
                status,
                cumulative_gas_used,
                logs,
            } => status.length() + cumulative_gas_used.length() + logs.length(),
        }
    }
}

impl Encodable for TxReceipt {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        match self {
            Self::PreByzantium {
                state_root,
                cumulative_gas_used,
                logs,
            } => {
                state_root.encode(out);
                cumulative_gas_used.encode(out);
                logs.encode(out);
            }
            Self::PostByzantium {
                status,
                cumulative_gas_used,
                logs,
            } => {
                status.encode(out);
                cumulative_gas_used.encode(out);
                logs.encode(out);
            }
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        Header {
            list: true,
            payload_length,
        }
        .length()
            + payload_length
    }
}

impl Decodable for TxReceipt {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut payload = Header::decode_bytes(buf, true)?;

        // a 32-byte first field selects the pre-Byzantium shape
        let first = Bytes::decode(&mut payload)?;
        let cumulative_gas_used = U256::decode(&mut payload)?;
        let logs = Vec::<Log>::decode(&mut payload)?;

        if first.len() == 32 {
            Ok(Self::PreByzantium {
                state_root: B256::from_slice(&first),
                cumulative_gas_used,
                logs,
            })
        } else if first.len() <= 1 {
            Ok(Self::PostByzantium {
                status: first.first().copied().unwrap_or(0) != 0,
                cumulative_gas_used,
                logs,
            })
        } else {
            Err(alloy_rlp::Error::Custom(
                "receipt first field is neither a state root nor a status",
            ))
        }
    }
}

/// A receipt annotated with its EIP-2718 envelope byte. Legacy receipts
/// (type 0) encode as the bare list; typed receipts as a byte string of
/// `type || rlp(receipt)`, matching the consensus receipts-trie encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxReceiptWithType {
    pub tx_type: u8,
    pub receipt: TxReceipt,
}

impl TxReceiptWithType {
    pub fn legacy(receipt: TxReceipt) -> Self {
        Self {
            tx_type: 0,
            receipt,
        }
    }

    pub fn typed(tx_type: u8, receipt: TxReceipt) -> Self {
        Self { tx_type, receipt }
    }
}

impl Encodable for TxReceiptWithType {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        if self.tx_type == 0 {
            self.receipt.encode(out);
        } else {
            let mut inner = Vec::with_capacity(1 + self.receipt.length());
            inner.push(self.tx_type);
            self.receipt.encode(&mut inner);
            inner.as_slice().encode(out);
        }
    }

    fn length(&self) -> usize {
        if self.tx_type == 0 {
            self.receipt.length()
        } else {
            let inner = 1 + self.receipt.length();
            Header {
                list: false,
                payload_length: inner,
            }
            .length()
                + inner
        }
    }
}

impl Decodable for TxReceiptWithType {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let Some(&first) = buf.first() else {
            return Err(alloy_rlp::Error::InputTooShort);
        };
        if first >= 0xc0 {
            // bare list: a legacy receipt
            return Ok(Self::legacy(TxReceipt::decode(buf)?));
        }
        let envelope = Header::decode_bytes(buf, false)?;
        let Some((&tx_type, mut receipt_rlp)) = envelope.split_first() else {
            return Err(alloy_rlp::Error::InputTooShort);
        };
        Ok(Self::typed(tx_type, TxReceipt::decode(&mut receipt_rlp)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::{address, b256};

    fn sample_logs() -> Vec<Log> {
        vec![Log::new(
            address!("00000000000000000000000000000000000000aa"),
            vec![b256!(
                "0101010101010101010101010101010101010101010101010101010101010101"
            )],
            Bytes::from_static(b"payload"),
        )]
    }

    #[test]
    fn post_byzantium_round_trip() {
        let receipt = TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(21_000),
            logs: sample_logs(),
        };
        let encoded = alloy_rlp::encode(&receipt);
        let decoded = TxReceipt::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn pre_byzantium_round_trip() {
        let receipt = TxReceipt::PreByzantium {
            state_root: b256!(
                "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"
            ),
            cumulative_gas_used: U256::from(500_000),
            logs: vec![],
        };
        let encoded = alloy_rlp::encode(&receipt);
        let decoded = TxReceipt::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
    }

    #[test]
    fn failed_status_round_trip() {
        let receipt = TxReceipt::PostByzantium {
            status: false,
            cumulative_gas_used: U256::from(1),
            logs: vec![],
        };
        let encoded = alloy_rlp::encode(&receipt);
        let decoded = TxReceipt::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
        assert!(!decoded.is_success());
    }

    #[test]
    fn typed_envelope_round_trip() {
        let receipt = TxReceiptWithType::typed(
            2,
            TxReceipt::PostByzantium {
                status: true,
                cumulative_gas_used: U256::from(42),
                logs: sample_logs(),
            },
        );
        let encoded = alloy_rlp::encode(&receipt);
        let decoded = TxReceiptWithType::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);

        let list = vec![
            TxReceiptWithType::legacy(TxReceipt::PostByzantium {
                status: true,
                cumulative_gas_used: U256::from(1),
                logs: vec![],
            }),
            receipt,
        ];
        let encoded = alloy_rlp::encode(&list);
        let decoded = Vec::<TxReceiptWithType>::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn bloom_covers_logs() {
        let receipt = TxReceipt::PostByzantium {
            status: true,
            cumulative_gas_used: U256::from(1),
            logs: sample_logs(),
        };
        let bloom = receipt.bloom();
        assert!(bloom.contains_input(receipt.logs()[0].address.as_slice()));
        assert!(bloom.contains_input(receipt.logs()[0].topics[0].as_slice()));
    }
}
