use crate::engine::core::encoding::fsst::decode_fsst;
use crate::engine::core::vector::algebra::{
    FilterAlgebra, Predicate, narrow_rows, select_rows,
};
use crate::engine::core::vector::nullability::Nullability;
use crate::engine::core::vector::selection::SelectionVector;
use crate::engine::errors::DecodeError;
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
struct FsstTable {
    symbols: Vec<u8>,
    symbol_lengths: Vec<u32>,
    compressed: Vec<u8>,
}

/// Dictionary entries addressed by `offsets[k]..offsets[k + 1]`.
///
/// FSST-compressed dictionaries keep the compressed form until the first
/// access, then cache the expanded bytes.
#[derive(Debug)]
pub struct Dictionary {
    offsets: Vec<u32>,
    fsst: Option<FsstTable>,
    bytes: OnceCell<Vec<u8>>,
}

impl Dictionary {
    pub fn raw(offsets: Vec<u32>, bytes: Vec<u8>) -> Result<Self, DecodeError> {
        validate_offsets(&offsets, bytes.len())?;
        Ok(Self {
            offsets,
            fsst: None,
            bytes: OnceCell::with_value(bytes),
        })
    }

    pub fn fsst(
        offsets: Vec<u32>,
        symbols: Vec<u8>,
        symbol_lengths: Vec<u32>,
        compressed: Vec<u8>,
    ) -> Self {
        Self {
            offsets,
            fsst: Some(FsstTable {
                symbols,
                symbol_lengths,
                compressed,
            }),
            bytes: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fsst(&self) -> bool {
        self.fsst.is_some()
    }

    pub fn is_materialized(&self) -> bool {
        self.bytes.get().is_some()
    }

    pub fn bytes(&self) -> Result<&[u8], DecodeError> {
        self.bytes
            .get_or_try_init(|| {
                let Some(table) = &self.fsst else {
                    return Ok(Vec::new());
                };
                let bytes = decode_fsst(&table.symbols, &table.symbol_lengths, &table.compressed)?;
                validate_offsets(&self.offsets, bytes.len())?;
                trace!(
                    entries = self.len(),
                    bytes = bytes.len(),
                    "Expanded FSST dictionary"
                );
                Ok(bytes)
            })
            .map(Vec::as_slice)
    }

    pub fn entry(&self, index: u32) -> Result<&[u8], DecodeError> {
        let k = index as usize;
        if k >= self.len() {
            return Err(DecodeError::CorruptDictionaryIndex {
                index,
                size: self.len(),
            });
        }
        let bytes = self.bytes()?;
        Ok(&bytes[self.offsets[k] as usize..self.offsets[k + 1] as usize])
    }
}

fn validate_offsets(offsets: &[u32], len: usize) -> Result<(), DecodeError> {
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(DecodeError::CorruptStream(
            "string offsets are not monotonic".into(),
        ));
    }
    if let Some(&last) = offsets.last() {
        if last as usize > len {
            return Err(DecodeError::CorruptStream(format!(
                "string offsets reach {} but data holds {} bytes",
                last, len
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub enum StringData {
    /// One length-delimited value per row.
    Plain { offsets: Vec<u32>, data: Vec<u8> },
    /// One dictionary index per row; absent rows hold index 0.
    Dictionary {
        indices: Vec<u32>,
        dictionary: Arc<Dictionary>,
    },
}

#[derive(Clone, Debug)]
pub struct StringVector {
    name: String,
    size: usize,
    nullability: Nullability,
    data: StringData,
}

impl StringVector {
    /// `offsets` has one entry per row plus a trailing end offset.
    pub fn plain(
        name: impl Into<String>,
        offsets: Vec<u32>,
        data: Vec<u8>,
        nullability: Nullability,
    ) -> Result<Self, DecodeError> {
        validate_offsets(&offsets, data.len())?;
        Ok(Self {
            name: name.into(),
            size: offsets.len().saturating_sub(1),
            nullability,
            data: StringData::Plain { offsets, data },
        })
    }

    /// Rejects any present row whose index falls outside the dictionary.
    pub fn dictionary(
        name: impl Into<String>,
        indices: Vec<u32>,
        dictionary: Arc<Dictionary>,
        nullability: Nullability,
    ) -> Result<Self, DecodeError> {
        let size = dictionary.len();
        for (row, &index) in indices.iter().enumerate() {
            if nullability.is_present(row) && index as usize >= size {
                return Err(DecodeError::CorruptDictionaryIndex { index, size });
            }
        }
        Ok(Self {
            name: name.into(),
            size: indices.len(),
            nullability,
            data: StringData::Dictionary {
                indices,
                dictionary,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &StringData {
        &self.data
    }

    pub fn nullability(&self) -> &Nullability {
        &self.nullability
    }

    pub fn is_present(&self, index: usize) -> bool {
        index < self.size && self.nullability.is_present(index)
    }

    pub fn get_bytes(&self, index: usize) -> Result<Option<&[u8]>, DecodeError> {
        if !self.is_present(index) {
            return Ok(None);
        }
        match &self.data {
            StringData::Plain { offsets, data } => Ok(Some(
                &data[offsets[index] as usize..offsets[index + 1] as usize],
            )),
            StringData::Dictionary {
                indices,
                dictionary,
            } => dictionary.entry(indices[index]).map(Some),
        }
    }

    pub fn get(&self, index: usize) -> Result<Option<Cow<'_, str>>, DecodeError> {
        Ok(self
            .get_bytes(index)?
            .map(|bytes| String::from_utf8_lossy(bytes)))
    }

    /// Predicate outcome per dictionary entry, evaluated once per entry.
    fn dictionary_hits(
        dictionary: &Dictionary,
        predicate: &Predicate<'_, str>,
    ) -> Result<Vec<bool>, DecodeError> {
        (0..dictionary.len() as u32)
            .map(|k| {
                let entry = dictionary.entry(k)?;
                Ok(predicate.test(|l| Some(entry.cmp(l.as_bytes()))))
            })
            .collect()
    }
}

impl FilterAlgebra<str> for StringVector {
    fn select(&self, predicate: &Predicate<'_, str>) -> Result<SelectionVector, DecodeError> {
        let accepts_null = predicate.accepts_null();
        match &self.data {
            StringData::Plain { offsets, data } => Ok(select_rows(
                self.size,
                &self.nullability,
                accepts_null,
                |i| {
                    let value = &data[offsets[i] as usize..offsets[i + 1] as usize];
                    predicate.test(|l| Some(value.cmp(l.as_bytes())))
                },
            )),
            StringData::Dictionary {
                indices,
                dictionary,
            } => {
                let hits = Self::dictionary_hits(dictionary, predicate)?;
                Ok(select_rows(
                    self.size,
                    &self.nullability,
                    accepts_null,
                    |i| hits.get(indices[i] as usize).copied().unwrap_or(false),
                ))
            }
        }
    }

    fn narrow(
        &self,
        predicate: &Predicate<'_, str>,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        let accepts_null = predicate.accepts_null();
        let size = self.size;
        match &self.data {
            StringData::Plain { offsets, data } => {
                narrow_rows(selection, &self.nullability, accepts_null, |i| {
                    if i >= size {
                        return false;
                    }
                    let value = &data[offsets[i] as usize..offsets[i + 1] as usize];
                    predicate.test(|l| Some(value.cmp(l.as_bytes())))
                });
            }
            StringData::Dictionary {
                indices,
                dictionary,
            } => {
                let hits = Self::dictionary_hits(dictionary, predicate)?;
                narrow_rows(selection, &self.nullability, accepts_null, |i| {
                    indices
                        .get(i)
                        .and_then(|&k| hits.get(k as usize).copied())
                        .unwrap_or(false)
                });
            }
        }
        Ok(())
    }
}
