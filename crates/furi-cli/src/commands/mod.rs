macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod annotate_ops;
pub mod config_ops;
pub mod lexicon_ops;
pub mod romaji_ops;
