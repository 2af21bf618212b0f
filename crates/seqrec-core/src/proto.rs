//! Messages from `tensorflow/core/example/{feature,example}.proto`.
//!
//! Written out by hand in the shape `prost-build` generates. Maps use
//! `BTreeMap` so that encoding the same message always yields the same bytes.

use std::collections::BTreeMap;

/// repeated bytes
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BytesList {
    /// values
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

/// repeated packed float
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatList {
    /// values
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

/// repeated packed int64
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64List {
    /// values
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

/// one of the three list kinds
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Feature {
    /// the list carried by this feature
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

/// nested types of `Feature`
pub mod feature {
    /// list kinds
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        /// bytes
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        /// floats
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        /// integers
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

/// named features
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Features {
    /// name -> feature
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

/// ordered features, one per time step
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureList {
    /// time steps
    #[prost(message, repeated, tag = "1")]
    pub feature: Vec<Feature>,
}

/// named feature lists
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureLists {
    /// name -> feature list
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature_list: BTreeMap<String, FeatureList>,
}

/// flat record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Example {
    /// features of the record
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

/// record with per-sequence context and per-step feature lists
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SequenceExample {
    /// per-sequence features
    #[prost(message, optional, tag = "1")]
    pub context: Option<Features>,
    /// per-step features
    #[prost(message, optional, tag = "2")]
    pub feature_lists: Option<FeatureLists>,
}

impl Feature {
    /// float feature
    pub fn floats(value: Vec<f32>) -> Self {
        Feature {
            kind: Some(feature::Kind::FloatList(FloatList { value })),
        }
    }

    /// int64 feature
    pub fn int64s(value: Vec<i64>) -> Self {
        Feature {
            kind: Some(feature::Kind::Int64List(Int64List { value })),
        }
    }

    /// name of the list kind, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            Some(feature::Kind::BytesList(_)) => "bytes_list",
            Some(feature::Kind::FloatList(_)) => "float_list",
            Some(feature::Kind::Int64List(_)) => "int64_list",
            None => "empty",
        }
    }
}
