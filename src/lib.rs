//! hanmatch 函式庫入口
//!
//! 只公開 tonic 生成的 protobuf 型別；遊戲核心與服務層
//! 編譯在二進位 crate 內（見 `src/main.rs`）。

pub mod proto {
    tonic::include_proto!("hanmatch");
}
