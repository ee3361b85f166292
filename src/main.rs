use clap::{arg,crate_version,value_parser,Command};
use lzrange::{lzr,MatchFinderKind};
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("existing file will not be truncated");
            return true;
        }
        return false;
    }
    true
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `lzrange compress -i my_expanded -o my_compressed`
Big window:    `lzrange compress -d 24 --fast-bytes 128 -i my_expanded -o my_compressed`
Expand:        `lzrange expand -i my_compressed -o my_expanded`";

    let match_finders = ["bt2","bt4"];

    let mut main_cmd = Command::new("lzrange")
        .about("Compress and expand with LZ77 and range coding")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-d --dictionary <DICT_LOG2> "log2 of dictionary size")
            .value_parser(value_parser!(u32).range(12..=30)))
        .arg(arg!(--"fast-bytes" <N> "longest match to look for")
            .value_parser(value_parser!(u32).range(5..=lzr::MATCH_MAX_LEN as i64)))
        .arg(arg!(--mf <MF> "match finder").value_parser(match_finders))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let mut opt = lzr::STD_OPTIONS;
        if let Some(log2) = cmd.get_one::<u32>("dictionary") {
            opt.dictionary_size = 1 << log2;
        }
        if let Some(n) = cmd.get_one::<u32>("fast-bytes") {
            opt.match_max_len = *n;
        }
        if let Some(mf) = cmd.get_one::<String>("mf") {
            // "bt4" hashes 4 bytes, etc.
            opt.match_finder = MatchFinderKind::from_hash_bytes(mf[2..].parse()?)?;
        }
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = lzr::compress(&mut in_file,&mut out_file,&opt)?;
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
        let (in_size,out_size) = lzr::expand(&mut in_file,&mut out_file,&lzr::STD_OPTIONS)?;
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    Ok(())
}
