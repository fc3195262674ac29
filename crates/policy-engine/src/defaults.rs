//! Built-in deny catalogue.
//!
//! These are configuration data rather than engine logic: a policy file may
//! replace either list. Order matters because the first matching rule wins.

/// Class names and packages that must never be resolved while deserializing.
pub static DESERIALIZATION_DENY: &[&str] = &[
    "com.caucho.config.types.",
    "com.caucho.hessian.test.",
    "com.caucho.naming.",
    "com.mchange.v2.c3p0.",
    "com.mysql.jdbc.util.",
    "com.rometools.rome.feed.",
    "com.sun.corba.se.impl.",
    "com.sun.corba.se.spi.orbutil.",
    "com.sun.jndi.rmi.",
    "com.sun.jndi.toolkit.",
    "com.sun.org.apache.bcel.internal.",
    "com.sun.org.apache.xalan.internal.",
    "com.sun.rowset.",
    "com.sun.xml.internal.bind.v2.",
    "java.awt.",
    "java.beans.",
    "java.lang.ProcessBuilder",
    "java.lang.Runtime",
    "java.rmi.server.",
    "java.security.",
    "java.util.ServiceLoader",
    "java.util.StringTokenizer",
    "javax.imageio.",
    "javax.imageio.spi.",
    "javax.management.",
    "javax.media.jai.remote.",
    "javax.naming.",
    "javax.script.",
    "javax.sound.sampled.",
    "javax.swing.",
    "javax.xml.transform.",
    "oracle.jdbc.connector.",
    "oracle.jdbc.pool.",
    "org.apache.aries.transaction.jms.",
    "org.apache.bcel.util.",
    "org.apache.carbondata.core.scan.expression.",
    "org.apache.commons.beanutils.",
    "org.apache.commons.codec.binary.",
    "org.apache.commons.collections.functors.",
    "org.apache.commons.collections4.functors.",
    "org.apache.commons.codec.",
    "org.apache.commons.configuration.",
    "org.apache.commons.configuration2.",
    "org.apache.commons.dbcp.datasources.",
    "org.apache.commons.dbcp2.datasources.",
    "org.apache.commons.fileupload.disk.",
    "org.apache.ibatis.executor.loader.",
    "org.apache.ibatis.javassist.bytecode.",
    "org.apache.ibatis.javassist.tools.",
    "org.apache.ibatis.javassist.util.",
    "org.apache.ignite.cache.",
    "org.apache.log.output.db.",
    "org.apache.log4j.receivers.db.",
    "org.apache.myfaces.view.facelets.el.",
    "org.apache.openjpa.ee.",
    "org.apache.shiro.",
    "org.apache.tomcat.dbcp.",
    "org.apache.velocity.runtime.",
    "org.apache.velocity.",
    "org.apache.wicket.util.",
    "org.apache.xalan.xsltc.trax.",
    "org.apache.xbean.naming.context.",
    "org.apache.xpath.",
    "org.apache.zookeeper.",
    "org.aspectj.",
    "org.codehaus.groovy.runtime.",
    "org.h2.value.",
    "org.hibernate.tuple.component.",
    "org.hibernate.type.",
    "org.jboss.ejb3.",
    "org.jboss.proxy.ejb.",
    "org.jboss.resteasy.plugins.server.resourcefactory.",
    "org.jboss.weld.interceptor.builder.",
    "org.thymeleaf.",
    "org.quartz.",
    "org.springframework.aop.aspectj.",
    "org.springframework.beans.BeanWrapperImpl$BeanPropertyHandler",
    "org.springframework.beans.factory.",
    "org.springframework.expression.spel.",
    "org.springframework.jndi.",
    "org.springframework.orm.",
    "org.springframework.transaction.",
    "org.yaml.snakeyaml.tokens.",
    "sun.print.",
    "sun.rmi.server.",
    "sun.rmi.transport.",
    "weblogic.ejb20.internal.",
    "weblogic.jms.common.",
];

/// Object-factory classes a naming lookup must never instantiate.
pub static OBJECT_FACTORY_DENY: &[&str] = &[
    "org.apache.naming.factory.",
    "org.apache.commons.dbcp.BasicDataSourceFactory",
    "org.apache.commons.dbcp2.BasicDataSourceFactory",
    "com.alibaba.druid.pool.DruidDataSourceFactory",
    "com.zaxxer.hikari.HikariJNDIFactory",
    "org.apache.tomcat.dbcp.",
    "org.apache.tomcat.jdbc.pool.DataSourceFactory",
    "com.mchange.v2.naming.",
    "com.mchange.v2.c3p0.",
];
