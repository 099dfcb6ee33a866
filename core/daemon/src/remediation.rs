//! Instructions shown when TF2 runs without `-condebug`.

use std::io::{self, BufRead, Write};

pub const CONDEBUG_INSTRUCTIONS: &str = "\
Your TF2 installation doesn't yet seem to be set up properly. To fix:
1. Right click on Team Fortress 2 in your Steam library
2. Open properties (very bottom)
3. Click \"Set launch options...\"
4. Add -condebug
5. OK and Close
6. Restart TF2";

/// Prints the setup instructions and waits for the user to press enter.
pub fn prompt_condebug(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "\n{}\n", CONDEBUG_INSTRUCTIONS)?;
    write!(output, "Press enter to retry")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
