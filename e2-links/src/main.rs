// Copyright 2024 Everything2 Development Team. All rights reserved.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Command line tool to exercise e2-links.

#![forbid(unsafe_code)]

use e2_links::{analysis, html, Parser};

use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

fn dry_run(text: &str) {
    let count = Parser::new(text).count();
    println!("{} tokens", count);
}

fn print_tokens(text: &str) {
    let parser = Parser::new(text).into_offset_iter();
    for (token, range) in parser {
        println!("{:?}: {:?}", range, token);
    }
    println!("EOF");
}

fn analyze(text: &str) -> io::Result<()> {
    let report = analysis::scan_document(text);
    serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
    println!();
    Ok(())
}

fn render(input: &str) -> io::Result<()> {
    let parser = Parser::new(input);
    let stdio = io::stdout();
    let buffer = std::io::BufWriter::with_capacity(1024 * 1024, stdio.lock());
    html::write_html_io(buffer, parser)
}

fn brief(program: &str) -> String {
    format!(
        "Usage: {} [options]\n\n{}",
        program, "Reads Everything2 link markup from file or standard input and emits HTML.",
    )
}

pub fn main() -> std::io::Result<()> {
    let args: Vec<_> = env::args().collect();
    let mut opts = getopts::Options::new();
    opts.optflag("h", "help", "this help message");
    opts.optflag("d", "dry-run", "dry run, produce no output");
    opts.optflag("t", "tokens", "print token sequence instead of rendering");
    opts.optflag("a", "analyze", "print a JSON edge-case report per input");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}\n{}", f, opts.usage(&brief(&args[0])));
            std::process::exit(1);
        }
    };
    if matches.opt_present("help") {
        println!("{}", opts.usage(&brief(&args[0])));
        return Ok(());
    }

    let mut input = String::new();
    if !&matches.free.is_empty() {
        for filename in &matches.free {
            let real_path = PathBuf::from(filename);
            let mut f = File::open(&real_path).expect("file not found");
            f.read_to_string(&mut input)
                .expect("something went wrong reading the file");
            if matches.opt_present("tokens") {
                print_tokens(&input);
            } else if matches.opt_present("analyze") {
                analyze(&input)?;
            } else if matches.opt_present("dry-run") {
                dry_run(&input);
            } else {
                render(&input)?;
            }
        }
    } else {
        let _ = io::stdin().lock().read_to_string(&mut input);
        if matches.opt_present("tokens") {
            print_tokens(&input);
        } else if matches.opt_present("analyze") {
            analyze(&input)?;
        } else if matches.opt_present("dry-run") {
            dry_run(&input);
        } else {
            render(&input)?;
        }
    }

    Ok(())
}
