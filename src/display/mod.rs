/// 出力モジュール

mod csv_sink;

// パブリックAPIをエクスポート
pub use csv_sink::CsvSink;
