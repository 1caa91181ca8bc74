//! Platform-specific bootstrap install scripts. Each script embeds the
//! server URL and a raw join token; the agent registers itself over the
//! public registration endpoint on first start.

/// Canonicalizes a requested platform string. Unknown values pass through
/// lowercased so the caller can still branch on them.
#[must_use]
pub fn normalize_platform(input: &str) -> String {
    match input.trim().to_ascii_lowercase().as_str() {
        "win" | "windows" | "windows_nt" => "windows".to_string(),
        "mac" | "darwin" | "osx" => "darwin".to_string(),
        "linux" | "" => "linux".to_string(),
        other => other.to_string(),
    }
}

/// Renders the bootstrap script for a platform. Returns the script body and
/// its download filename.
#[must_use]
pub fn build_bootstrap_script(platform: &str, server_url: &str, token: &str) -> (String, String) {
    match normalize_platform(platform).as_str() {
        "windows" => (
            windows_bootstrap_script(server_url, token),
            "install.ps1".to_string(),
        ),
        _ => (
            unix_bootstrap_script(server_url, token),
            "install.sh".to_string(),
        ),
    }
}

fn unix_bootstrap_script(server_url: &str, token: &str) -> String {
    format!(
        r#"#!/bin/sh
SERVER="{server_url}"
TOKEN="{token}"
set -e
echo "Downloading agent..."
curl -fsSL "$SERVER/api/v1/agents/download/latest" -o /usr/local/bin/drover-agent
chmod +x /usr/local/bin/drover-agent
mkdir -p /etc/drover
cat > /etc/drover/agent.json <<EOF
{{"server_url":"$SERVER","join_token":"$TOKEN"}}
EOF
if command -v systemctl >/dev/null 2>&1; then
    cat >/etc/systemd/system/drover-agent.service <<EOL
[Unit]
Description=Drover Agent
After=network.target

[Service]
ExecStart=/usr/local/bin/drover-agent --config /etc/drover/agent.json
Restart=on-failure

[Install]
WantedBy=multi-user.target
EOL
    systemctl daemon-reload || true
    systemctl enable --now drover-agent || true
else
    /usr/local/bin/drover-agent --config /etc/drover/agent.json &
fi
"#
    )
}

fn windows_bootstrap_script(server_url: &str, token: &str) -> String {
    format!(
        r#"# PowerShell bootstrap for Drover
$ErrorActionPreference = "Stop"
$server = "{server_url}"
$token = "{token}"

$agentDir = Join-Path $env:ProgramFiles "Drover"
$agentExe = Join-Path $agentDir "drover-agent.exe"
$configDir = Join-Path $env:ProgramData "Drover"
$configPath = Join-Path $configDir "agent.json"

New-Item -ItemType Directory -Force -Path $agentDir | Out-Null
New-Item -ItemType Directory -Force -Path $configDir | Out-Null

Write-Host "Downloading agent binary..."
Invoke-WebRequest -Uri "$server/api/v1/agents/download/latest?platform=windows" -OutFile $agentExe -UseBasicParsing

$config = @{{ server_url = $server; join_token = $token }} | ConvertTo-Json
Set-Content -Path $configPath -Value $config -Encoding UTF8

& $agentExe --service install --config $configPath
& $agentExe --service start
Write-Host "Drover agent installed."
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_platform_aliases() {
        assert_eq!(normalize_platform("WIN"), "windows");
        assert_eq!(normalize_platform("osx"), "darwin");
        assert_eq!(normalize_platform(""), "linux");
        assert_eq!(normalize_platform("freebsd"), "freebsd");
    }

    #[test]
    fn scripts_embed_server_and_token() {
        let (script, filename) =
            build_bootstrap_script("linux", "https://fleet.example.com", "tok123");
        assert_eq!(filename, "install.sh");
        assert!(script.contains("https://fleet.example.com"));
        assert!(script.contains("tok123"));

        let (script, filename) = build_bootstrap_script("windows", "http://x", "tok456");
        assert_eq!(filename, "install.ps1");
        assert!(script.contains("tok456"));
    }

    #[test]
    fn unknown_platform_gets_unix_script() {
        let (_, filename) = build_bootstrap_script("freebsd", "http://x", "t");
        assert_eq!(filename, "install.sh");
    }
}
