// src/lib.rs
pub mod batch_files;
pub mod canonicalizer;
pub mod commitment;
pub mod compression;
pub mod encoder;
pub mod error;
pub mod hashing;
pub mod metadata;
pub mod operations;
pub mod processor;
pub mod protocol;
pub mod provider;
pub mod resolver;

// Re-export main types
pub use batch_files::{
    BatchFileKind, ChunkFile, ChunkReference, CoreIndexFile, CoreOperations, CoreProofFile,
    CoreProofOperations, CreateReference, OperationReference, ProvisionalIndexFile,
    ProvisionalOperations, ProvisionalProofFile, ProvisionalProofOperations,
};
pub use compression::Decompressor;
pub use error::{
    ApplyError, CasError, DecompressError, Error, ParseError, Result, StoreError,
};
pub use metadata::{
    DocumentMetadata, MetadataOptions, MetadataTransformer, PublishedOperation,
    TransformationInfo, UnpublishedOperation,
};
pub use operations::{
    sort_operations, AnchoredOperation, DeltaModel, OperationKind, OperationPayload,
    OperationRequest, SidetreeTxn, SuffixDataModel,
};
pub use processor::{TxnProcessor, TxnProcessorOptions};
pub use protocol::{
    Cas, DecompressionProvider, OperationApplier, OperationParser, OperationStore, Protocol,
    ProtocolParameters, ProtocolRegistry, UnpublishedOperationStore,
};
pub use provider::{parse_anchor_string, AnchorData, OperationProvider};
pub use resolver::{CommitmentKind, ResolutionModel, Resolver, ResolverOptions};
