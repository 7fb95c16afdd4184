use crate::engine::errors::DecodeError;

macro_rules! stream_tag {
    ($(#[$doc:meta])* $name:ident, $kind:literal { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl TryFrom<u8> for $name {
            type Error = DecodeError;

            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($value => Ok($name::$variant),)+
                    other => Err(DecodeError::InvalidStreamTag {
                        kind: $kind,
                        value: other as u32,
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(t: $name) -> u8 {
                t as u8
            }
        }
    };
}

stream_tag!(
    /// High nibble of the first stream header byte.
    PhysicalStreamType, "physical stream type" {
        Present = 0,
        Data = 1,
        Offset = 2,
        Length = 3,
    }
);

stream_tag!(DictionaryType, "dictionary type" {
    None = 0,
    Single = 1,
    Shared = 2,
    Vertex = 3,
    Morton = 4,
    Fsst = 5,
});

stream_tag!(OffsetType, "offset type" {
    Vertex = 0,
    Index = 1,
    String = 2,
    Key = 3,
});

stream_tag!(LengthType, "length type" {
    VarBinary = 0,
    Geometries = 1,
    Parts = 2,
    Rings = 3,
    Triangles = 4,
    Symbol = 5,
    Dictionary = 6,
});

stream_tag!(LogicalLevelTechnique, "logical level technique" {
    None = 0,
    Delta = 1,
    ComponentwiseDelta = 2,
    Rle = 3,
    Morton = 4,
    PseudoDecimal = 5,
});

stream_tag!(PhysicalLevelTechnique, "physical level technique" {
    None = 0,
    FastPfor = 1,
    Varint = 2,
    Alp = 3,
});

/// Low nibble of the first header byte, interpreted per physical stream type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalStreamType {
    None,
    Dictionary(DictionaryType),
    Offset(OffsetType),
    Length(LengthType),
}

impl LogicalStreamType {
    pub fn from_nibble(physical: PhysicalStreamType, nibble: u8) -> Result<Self, DecodeError> {
        Ok(match physical {
            PhysicalStreamType::Present => LogicalStreamType::None,
            PhysicalStreamType::Data => LogicalStreamType::Dictionary(nibble.try_into()?),
            PhysicalStreamType::Offset => LogicalStreamType::Offset(nibble.try_into()?),
            PhysicalStreamType::Length => LogicalStreamType::Length(nibble.try_into()?),
        })
    }

    pub fn dictionary_type(&self) -> Option<DictionaryType> {
        match self {
            LogicalStreamType::Dictionary(d) => Some(*d),
            _ => None,
        }
    }

    pub fn offset_type(&self) -> Option<OffsetType> {
        match self {
            LogicalStreamType::Offset(o) => Some(*o),
            _ => None,
        }
    }

    pub fn length_type(&self) -> Option<LengthType> {
        match self {
            LogicalStreamType::Length(l) => Some(*l),
            _ => None,
        }
    }
}
